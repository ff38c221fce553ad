//! 脚本运行时
//!
//! 持有符号表、类表、对象堆、全局变量和调用帧，并提供方法分派、异常抛出与捕获、
//! 以及标记-清除垃圾回收。

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::class::{ClassKind, ClassTable, NativeFn};
use super::exception::{ExceptionTable, ScriptException, Unwind, VmResult};
use super::object::{BoundType, DataState, ObjectStore, RObject};
use super::symbol::SymbolTable;
use super::value::{ClassId, ObjectId, SymbolId, Value};
use crate::bindings::args::ArityPolicy;
use crate::core::shared_state::SharedState;

/// 块（闭包）类型，由 `rgss_main` 等方法通过 `yield` 调用
pub type Block = Rc<dyn Fn(&mut ScriptRuntime) -> VmResult<Value>>;

const MAX_CALL_DEPTH: usize = 1024;

/// 运行时启动时创建的核心类
#[derive(Debug, Clone, Copy)]
pub struct CoreClasses {
    pub object: ClassId,
    pub module: ClassId,
    pub class: ClassId,
    pub kernel: ClassId,
    pub exception: ClassId,
    pub standard_error: ClassId,
    pub runtime_error: ClassId,
    pub type_error: ClassId,
    pub argument_error: ClassId,
    pub name_error: ClassId,
    pub no_method_error: ClassId,
    pub io_error: ClassId,
    pub system_call_error: ClassId,
    pub errno: ClassId,
    pub enoent: ClassId,
    pub system_exit: ClassId,
    pub fatal: ClassId,
}

struct Frame {
    label: String,
    receiver: Value,
    block: Option<Block>,
}

/// 脚本运行时上下文
pub struct ScriptRuntime {
    pub(crate) symbols: SymbolTable,
    pub(crate) classes: ClassTable,
    pub(crate) objects: ObjectStore,
    pub(crate) globals: HashMap<SymbolId, Value>,
    pub(crate) exceptions: Option<ExceptionTable>,
    pub(crate) core: CoreClasses,
    pinned: Vec<Value>,
    frames: Vec<Frame>,
    shared: Option<SharedState>,
    arity: ArityPolicy,
    rgss_version: u8,
}

impl Default for ScriptRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptRuntime {
    pub fn new() -> Self {
        Self::with_arity(ArityPolicy::default())
    }

    pub fn with_arity(arity: ArityPolicy) -> Self {
        let mut classes = ClassTable::new();
        let core = bootstrap(&mut classes);
        let mut runtime = Self {
            symbols: SymbolTable::new(),
            classes,
            objects: ObjectStore::new(),
            globals: HashMap::new(),
            exceptions: None,
            core,
            pinned: Vec::new(),
            frames: Vec::new(),
            shared: None,
            arity,
            rgss_version: 3,
        };
        runtime.register_core_constants();
        runtime
    }

    fn register_core_constants(&mut self) {
        let core = self.core;
        let top_level = [
            core.object,
            core.module,
            core.class,
            core.kernel,
            core.exception,
            core.standard_error,
            core.runtime_error,
            core.type_error,
            core.argument_error,
            core.name_error,
            core.no_method_error,
            core.io_error,
            core.system_call_error,
            core.errno,
            core.system_exit,
            core.fatal,
        ];
        for class in top_level {
            let name = self.classes.get(class).name.clone();
            self.const_set(core.object, &name, Value::Class(class));
        }
        self.const_set(core.errno, "ENOENT", Value::Class(core.enoent));
    }

    pub fn core(&self) -> &CoreClasses {
        &self.core
    }

    pub fn arity_policy(&self) -> ArityPolicy {
        self.arity
    }

    pub fn set_arity_policy(&mut self, arity: ArityPolicy) {
        self.arity = arity;
    }

    pub fn rgss_version(&self) -> u8 {
        self.rgss_version
    }

    pub fn set_rgss_version(&mut self, version: u8) {
        self.rgss_version = version;
    }

    // ---- shared state ----

    pub fn attach_shared_state(&mut self, state: SharedState) {
        self.shared = Some(state);
    }

    pub fn detach_shared_state(&mut self) -> Option<SharedState> {
        self.shared.take()
    }

    pub fn shared(&self) -> Option<&SharedState> {
        self.shared.as_ref()
    }

    pub fn shared_mut(&mut self) -> Option<&mut SharedState> {
        self.shared.as_mut()
    }

    // ---- symbols ----

    pub fn intern(&mut self, name: &str) -> SymbolId {
        self.symbols.intern(name)
    }

    pub fn symbol(&mut self, name: &str) -> Value {
        Value::Symbol(self.intern(name))
    }

    pub fn symbol_name(&self, id: SymbolId) -> &str {
        self.symbols.name(id)
    }

    // ---- classes and modules ----

    pub fn class_name(&self, class: ClassId) -> &str {
        &self.classes.get(class).name
    }

    pub fn superclass(&self, class: ClassId) -> Option<ClassId> {
        self.classes.get(class).superclass
    }

    /// 定义顶层类；同名类已存在时直接返回
    pub fn define_class(&mut self, name: &str, superclass: ClassId) -> ClassId {
        let object = self.core.object;
        self.define_class_under(object, name, superclass)
    }

    pub fn define_module(&mut self, name: &str) -> ClassId {
        let object = self.core.object;
        self.define_module_under(object, name)
    }

    pub fn define_class_under(&mut self, outer: ClassId, name: &str, superclass: ClassId) -> ClassId {
        self.define_namespaced(outer, name, ClassKind::Class, Some(superclass))
    }

    pub fn define_module_under(&mut self, outer: ClassId, name: &str) -> ClassId {
        self.define_namespaced(outer, name, ClassKind::Module, None)
    }

    fn define_namespaced(
        &mut self,
        outer: ClassId,
        name: &str,
        kind: ClassKind,
        superclass: Option<ClassId>,
    ) -> ClassId {
        if let Some(Value::Class(existing)) = self.const_get(outer, name) {
            return existing;
        }
        let full_name = if outer == self.core.object {
            name.to_string()
        } else {
            format!("{}::{}", self.classes.get(outer).name, name)
        };
        let id = self.classes.define(full_name, kind, superclass);
        self.const_set(outer, name, Value::Class(id));
        id
    }

    pub fn define_method(&mut self, class: ClassId, name: &str, func: NativeFn) {
        let sym = self.intern(name);
        self.classes.get_mut(class).methods.insert(sym, func);
    }

    /// 定义类方法或模块函数
    pub fn define_singleton_method(&mut self, class: ClassId, name: &str, func: NativeFn) {
        let sym = self.intern(name);
        self.classes.get_mut(class).singleton_methods.insert(sym, func);
    }

    pub fn define_alloc_func(&mut self, class: ClassId, ty: &'static BoundType) {
        self.classes.get_mut(class).allocator = Some(ty);
    }

    pub fn const_set(&mut self, class: ClassId, name: &str, value: Value) {
        let sym = self.intern(name);
        self.classes.get_mut(class).constants.insert(sym, value);
    }

    pub fn const_get(&self, class: ClassId, name: &str) -> Option<Value> {
        let sym = self.symbols.lookup(name)?;
        self.classes.get(class).constants.get(&sym).cloned()
    }

    /// 解析 `A::B` 形式的常量路径，找不到时抛出 NameError
    pub fn const_lookup(&self, path: &str) -> VmResult<Value> {
        let mut scope = self.core.object;
        let mut found = Value::Class(scope);
        for segment in path.split("::") {
            match self.const_get(scope, segment) {
                Some(value) => {
                    if let Value::Class(inner) = value {
                        scope = inner;
                    }
                    found = value;
                }
                None => {
                    return Err(self.raise(
                        self.core.name_error,
                        format!("uninitialized constant {}", path),
                    ))
                }
            }
        }
        Ok(found)
    }

    pub fn class_of(&self, value: &Value) -> Option<ClassId> {
        match value {
            Value::Object(id) => self.objects.get(*id).map(|object| object.class),
            Value::Class(id) if self.classes.get(*id).is_module() => Some(self.core.module),
            Value::Class(_) => Some(self.core.class),
            _ => None,
        }
    }

    pub fn class_name_of(&self, value: &Value) -> String {
        if let Some(name) = value.builtin_class_name() {
            return name.to_string();
        }
        match self.class_of(value) {
            Some(class) => self.class_name(class).to_string(),
            None => "Object".to_string(),
        }
    }

    pub fn is_kind_of(&self, value: &Value, class: ClassId) -> bool {
        match self.class_of(value) {
            Some(own) => self.classes.is_subclass_of(own, class),
            None => class == self.core.object,
        }
    }

    // ---- variables ----

    pub fn gv_set(&mut self, name: &str, value: Value) {
        let sym = self.intern(name);
        self.globals.insert(sym, value);
    }

    pub fn gv_get(&self, name: &str) -> Value {
        self.symbols
            .lookup(name)
            .and_then(|sym| self.globals.get(&sym).cloned())
            .unwrap_or_default()
    }

    pub fn ivar_set(&mut self, target: &Value, name: &str, value: Value) -> VmResult<()> {
        let sym = self.intern(name);
        match target {
            Value::Object(id) => match self.objects.get_mut(*id) {
                Some(object) => {
                    object.ivars.insert(sym, value);
                    Ok(())
                }
                None => Err(self.reclaimed()),
            },
            Value::Class(id) => {
                self.classes.get_mut(*id).ivars.insert(sym, value);
                Ok(())
            }
            other => Err(self.raise(
                self.core.runtime_error,
                format!("can't modify frozen {}", self.class_name_of(other)),
            )),
        }
    }

    pub fn ivar_get(&self, target: &Value, name: &str) -> Value {
        let Some(sym) = self.symbols.lookup(name) else {
            return Value::Nil;
        };
        let ivars = match target {
            Value::Object(id) => self.objects.get(*id).map(|object| &object.ivars),
            Value::Class(id) => Some(&self.classes.get(*id).ivars),
            _ => None,
        };
        ivars
            .and_then(|ivars| ivars.get(&sym).cloned())
            .unwrap_or_default()
    }

    // ---- dispatch ----

    pub fn call(&mut self, receiver: &Value, name: &str, args: &[Value]) -> VmResult<Value> {
        self.call_with_block(receiver, name, args, None)
    }

    pub fn call_with_block(
        &mut self,
        receiver: &Value,
        name: &str,
        args: &[Value],
        block: Option<Block>,
    ) -> VmResult<Value> {
        let sym = self.intern(name);
        let method = match receiver {
            Value::Class(id) => self.classes.find_singleton_method(*id, sym),
            Value::Object(id) => {
                let Some(object) = self.objects.get(*id) else {
                    return Err(self.reclaimed());
                };
                self.classes.find_method(object.class, sym)
            }
            _ => None,
        };
        match method {
            Some(func) => {
                let label = self.method_label(receiver, name);
                self.invoke(label, receiver, block, |vm| func(vm, receiver, args))
            }
            None => self.call_builtin(receiver, name, args, block),
        }
    }

    /// 调用 Kernel 模块函数
    pub fn call_function(&mut self, name: &str, args: &[Value]) -> VmResult<Value> {
        self.call_function_with_block(name, args, None)
    }

    pub fn call_function_with_block(
        &mut self,
        name: &str,
        args: &[Value],
        block: Option<Block>,
    ) -> VmResult<Value> {
        let kernel = Value::Class(self.core.kernel);
        self.call_with_block(&kernel, name, args, block)
    }

    /// 以命名帧执行一段脚本体
    pub fn run_frame<T>(
        &mut self,
        label: &str,
        body: impl FnOnce(&mut Self) -> VmResult<T>,
    ) -> VmResult<T> {
        self.invoke(label.to_string(), &Value::Nil, None, body)
    }

    fn invoke<T>(
        &mut self,
        label: String,
        receiver: &Value,
        block: Option<Block>,
        body: impl FnOnce(&mut Self) -> VmResult<T>,
    ) -> VmResult<T> {
        if self.frames.len() >= MAX_CALL_DEPTH {
            return Err(self.raise(self.core.runtime_error, "stack level too deep"));
        }
        self.frames.push(Frame {
            label,
            receiver: receiver.clone(),
            block,
        });
        let result = body(self);
        self.frames.pop();
        result
    }

    fn method_label(&self, receiver: &Value, name: &str) -> String {
        match receiver {
            Value::Class(id) => format!("{}.{}", self.class_name(*id), name),
            other => format!("{}#{}", self.class_name_of(other), name),
        }
    }

    fn call_builtin(
        &mut self,
        receiver: &Value,
        name: &str,
        args: &[Value],
        block: Option<Block>,
    ) -> VmResult<Value> {
        match (receiver, name) {
            (Value::Class(class), "new") if !self.classes.get(*class).is_module() => {
                self.instantiate(*class, args, block)
            }
            (Value::Object(_), "dup" | "clone") => self.duplicate(receiver),
            (Value::Object(_) | Value::Class(_), "class") => Ok(self
                .class_of(receiver)
                .map(Value::Class)
                .unwrap_or_default()),
            (_, "inspect") => Ok(Value::Str(self.inspect(receiver))),
            (_, "to_s") => Ok(Value::Str(self.to_s(receiver))),
            (_, "nil?") => Ok(Value::Bool(receiver.is_nil())),
            (_, "is_a?" | "kind_of?") => match args {
                [Value::Class(class)] => Ok(Value::Bool(self.is_kind_of(receiver, *class))),
                _ => Err(self.raise(
                    self.core.type_error,
                    "class or module required",
                )),
            },
            _ => Err(self.raise(
                self.core.no_method_error,
                format!(
                    "undefined method `{}' for {}",
                    name,
                    self.inspect(receiver)
                ),
            )),
        }
    }

    /// `Class#new`: 分配对象并调用 `initialize`
    pub fn instantiate(
        &mut self,
        class: ClassId,
        args: &[Value],
        block: Option<Block>,
    ) -> VmResult<Value> {
        let bound = self.classes.allocator(class);
        let object = Value::Object(self.objects.insert(RObject::new(class, bound)));
        let initialize = self.intern("initialize");
        if self.classes.find_method(class, initialize).is_some() {
            self.call_with_block(&object, "initialize", args, block)?;
        } else if !args.is_empty() {
            return Err(self.raise(
                self.core.argument_error,
                format!("wrong number of arguments (given {}, expected 0)", args.len()),
            ));
        }
        Ok(object)
    }

    /// `dup`/`clone`: 复制实例变量并调用 `initialize_copy`
    fn duplicate(&mut self, original: &Value) -> VmResult<Value> {
        let Value::Object(id) = original else {
            return Ok(original.clone());
        };
        let Some(source) = self.objects.get(*id) else {
            return Err(self.reclaimed());
        };
        let mut copy = RObject::new(source.class, source.bound);
        copy.ivars = source.ivars.clone();
        let class = source.class;
        let copy = Value::Object(self.objects.insert(copy));
        let initialize_copy = self.intern("initialize_copy");
        if self.classes.find_method(class, initialize_copy).is_some() {
            self.call(&copy, "initialize_copy", std::slice::from_ref(original))?;
        }
        Ok(copy)
    }

    /// 当前帧的块
    pub fn current_block(&self) -> Option<Block> {
        self.frames.last().and_then(|frame| frame.block.clone())
    }

    pub fn block_given(&self) -> bool {
        self.frames
            .last()
            .map(|frame| frame.block.is_some())
            .unwrap_or(false)
    }

    pub fn call_depth(&self) -> usize {
        self.frames.len()
    }

    // ---- exceptions ----

    /// 构造异常展开信号
    ///
    /// 重置类产生 `Unwind::Reset`，`SystemExit` 产生 `Unwind::Terminate`。
    pub fn raise(&self, class: ClassId, message: impl Into<String>) -> Unwind {
        if class == self.core.system_exit {
            return Unwind::Terminate;
        }
        if let Some(table) = &self.exceptions {
            if table.kind_of(class) == Some(super::exception::ExceptionKind::Reset) {
                return Unwind::Reset;
            }
        }
        Unwind::Raise(ScriptException {
            class,
            class_name: self.class_name(class).to_string(),
            message: message.into(),
            backtrace: self.backtrace(),
        })
    }

    pub fn backtrace(&self) -> Vec<String> {
        self.frames
            .iter()
            .rev()
            .map(|frame| frame.label.clone())
            .collect()
    }

    /// 捕获普通异常；重置和终止信号继续向上展开
    pub fn rescue<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> VmResult<T>,
        handler: impl FnOnce(&mut Self, ScriptException) -> VmResult<T>,
    ) -> VmResult<T> {
        match body(self) {
            Err(Unwind::Raise(exc)) => handler(self, exc),
            other => other,
        }
    }

    // ---- inspection ----

    pub fn inspect(&self, value: &Value) -> String {
        match value {
            Value::Nil => "nil".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Str(s) => format!("{:?}", s),
            Value::Bytes(bytes) => format!("\"{}\"", bytes.escape_ascii()),
            Value::Symbol(sym) => format!(":{}", self.symbol_name(*sym)),
            Value::Array(items) => {
                let inner: Vec<String> = items.iter().map(|item| self.inspect(item)).collect();
                format!("[{}]", inner.join(", "))
            }
            Value::Object(id) => match self.objects.get(*id) {
                Some(object) => {
                    let disposed = matches!(object.data, DataState::Disposed);
                    format!(
                        "#<{}:{}{}>",
                        self.class_name(object.class),
                        id,
                        if disposed { " (disposed)" } else { "" }
                    )
                }
                None => format!("#<reclaimed:{}>", id),
            },
            Value::Class(id) => self.class_name(*id).to_string(),
        }
    }

    pub fn to_s(&self, value: &Value) -> String {
        match value {
            Value::Nil => String::new(),
            Value::Str(s) => s.clone(),
            Value::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Value::Symbol(sym) => self.symbol_name(*sym).to_string(),
            other => self.inspect(other),
        }
    }

    // ---- garbage collection ----

    /// 使值在垃圾回收中保持存活
    pub fn pin(&mut self, value: Value) {
        self.pinned.push(value);
    }

    pub fn unpin(&mut self, value: &Value) {
        if let Some(pos) = self.pinned.iter().rposition(|pinned| pinned == value) {
            self.pinned.swap_remove(pos);
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// 标记-清除回收，返回回收的对象数量
    pub fn gc(&mut self) -> usize {
        let mut stack: Vec<Value> = Vec::new();
        stack.extend(self.globals.values().cloned());
        stack.extend(self.pinned.iter().cloned());
        stack.extend(self.frames.iter().map(|frame| frame.receiver.clone()));
        for class in self.classes.iter() {
            stack.extend(class.constants.values().cloned());
            stack.extend(class.ivars.values().cloned());
        }

        let mut marked: HashSet<ObjectId> = HashSet::new();
        while let Some(value) = stack.pop() {
            match value {
                Value::Array(items) => stack.extend(items),
                Value::Object(id) => {
                    if !marked.insert(id) {
                        continue;
                    }
                    if let Some(object) = self.objects.get(id) {
                        stack.extend(object.ivars.values().cloned());
                        if let DataState::Alias { parent, .. } = object.data {
                            stack.push(Value::Object(parent));
                        }
                    }
                }
                _ => {}
            }
        }

        let dead: Vec<ObjectId> = self
            .objects
            .ids()
            .filter(|id| !marked.contains(id))
            .collect();
        for id in &dead {
            if let Some(object) = self.objects.remove(*id) {
                object.finalize();
            }
        }
        tracing::debug!(target: "scripting", reclaimed = dead.len(), live = self.objects.len(), "garbage collected");
        dead.len()
    }

    /// 释放所有对象并清理异常表和共享状态
    pub fn teardown(&mut self) -> Option<SharedState> {
        let ids: Vec<ObjectId> = self.objects.ids().collect();
        for id in ids {
            if let Some(object) = self.objects.remove(id) {
                object.finalize();
            }
        }
        self.globals.clear();
        self.pinned.clear();
        self.clear_exception_table();
        self.detach_shared_state()
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        String::from(if f > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        f.to_string()
    }
}

fn bootstrap(classes: &mut ClassTable) -> CoreClasses {
    let object = classes.define("Object", ClassKind::Class, None);
    let module = classes.define("Module", ClassKind::Class, Some(object));
    let class = classes.define("Class", ClassKind::Class, Some(module));
    let kernel = classes.define("Kernel", ClassKind::Module, None);
    let exception = classes.define("Exception", ClassKind::Class, Some(object));
    let standard_error = classes.define("StandardError", ClassKind::Class, Some(exception));
    let runtime_error = classes.define("RuntimeError", ClassKind::Class, Some(standard_error));
    let type_error = classes.define("TypeError", ClassKind::Class, Some(standard_error));
    let argument_error = classes.define("ArgumentError", ClassKind::Class, Some(standard_error));
    let name_error = classes.define("NameError", ClassKind::Class, Some(standard_error));
    let no_method_error = classes.define("NoMethodError", ClassKind::Class, Some(name_error));
    let io_error = classes.define("IOError", ClassKind::Class, Some(standard_error));
    let system_call_error =
        classes.define("SystemCallError", ClassKind::Class, Some(standard_error));
    let errno = classes.define("Errno", ClassKind::Module, None);
    let enoent = classes.define("Errno::ENOENT", ClassKind::Class, Some(system_call_error));
    let system_exit = classes.define("SystemExit", ClassKind::Class, Some(exception));
    let fatal = classes.define("fatal", ClassKind::Class, Some(exception));

    CoreClasses {
        object,
        module,
        class,
        kernel,
        exception,
        standard_error,
        runtime_error,
        type_error,
        argument_error,
        name_error,
        no_method_error,
        io_error,
        system_call_error,
        errno,
        enoent,
        system_exit,
        fatal,
    }
}
