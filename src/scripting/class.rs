use std::collections::HashMap;

use super::exception::VmResult;
use super::object::BoundType;
use super::runtime::ScriptRuntime;
use super::value::{ClassId, SymbolId, Value};

/// 原生方法签名
///
/// 接收运行时、接收者和调用参数，返回脚本值或展开信号。
pub type NativeFn = fn(&mut ScriptRuntime, &Value, &[Value]) -> VmResult<Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Module,
}

/// 类或模块
#[derive(Debug)]
pub struct RClass {
    /// 完整路径名，例如 `Errno::ENOENT`
    pub name: String,
    pub kind: ClassKind,
    pub superclass: Option<ClassId>,
    pub(crate) allocator: Option<&'static BoundType>,
    pub(crate) methods: HashMap<SymbolId, NativeFn>,
    pub(crate) singleton_methods: HashMap<SymbolId, NativeFn>,
    pub(crate) constants: HashMap<SymbolId, Value>,
    pub(crate) ivars: HashMap<SymbolId, Value>,
}

impl RClass {
    fn new(name: String, kind: ClassKind, superclass: Option<ClassId>) -> Self {
        Self {
            name,
            kind,
            superclass,
            allocator: None,
            methods: HashMap::new(),
            singleton_methods: HashMap::new(),
            constants: HashMap::new(),
            ivars: HashMap::new(),
        }
    }

    pub fn is_module(&self) -> bool {
        self.kind == ClassKind::Module
    }
}

/// 类表
#[derive(Debug, Default)]
pub struct ClassTable {
    classes: Vec<RClass>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(
        &mut self,
        name: impl Into<String>,
        kind: ClassKind,
        superclass: Option<ClassId>,
    ) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(RClass::new(name.into(), kind, superclass));
        id
    }

    pub fn get(&self, id: ClassId) -> &RClass {
        &self.classes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: ClassId) -> &mut RClass {
        &mut self.classes[id.0 as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &RClass> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// 沿父类链查找实例方法
    pub fn find_method(&self, class: ClassId, name: SymbolId) -> Option<NativeFn> {
        self.ancestors(class)
            .find_map(|id| self.get(id).methods.get(&name).copied())
    }

    /// 沿父类链查找单例方法（类方法或模块函数）
    pub fn find_singleton_method(&self, class: ClassId, name: SymbolId) -> Option<NativeFn> {
        self.ancestors(class)
            .find_map(|id| self.get(id).singleton_methods.get(&name).copied())
    }

    /// 继承得到的分配器描述符
    pub fn allocator(&self, class: ClassId) -> Option<&'static BoundType> {
        self.ancestors(class).find_map(|id| self.get(id).allocator)
    }

    pub fn is_subclass_of(&self, class: ClassId, ancestor: ClassId) -> bool {
        self.ancestors(class).any(|id| id == ancestor)
    }

    pub fn ancestors(&self, class: ClassId) -> Ancestors<'_> {
        Ancestors {
            table: self,
            next: Some(class),
        }
    }
}

/// Walks a class and its superclasses.
pub struct Ancestors<'a> {
    table: &'a ClassTable,
    next: Option<ClassId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ClassId;

    fn next(&mut self) -> Option<ClassId> {
        let current = self.next?;
        self.next = self.table.get(current).superclass;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(_vm: &mut ScriptRuntime, _this: &Value, _args: &[Value]) -> VmResult<Value> {
        Ok(Value::Int(42))
    }

    #[test]
    fn test_method_lookup_walks_superclass_chain() {
        let mut table = ClassTable::new();
        let base = table.define("Base", ClassKind::Class, None);
        let derived = table.define("Derived", ClassKind::Class, Some(base));
        let name = SymbolId(0);

        table.get_mut(base).methods.insert(name, answer);

        assert!(table.find_method(derived, name).is_some());
        assert!(table.find_singleton_method(derived, name).is_none());
        assert!(table.is_subclass_of(derived, base));
        assert!(!table.is_subclass_of(base, derived));
    }

    #[test]
    fn test_ancestors_order() {
        let mut table = ClassTable::new();
        let a = table.define("A", ClassKind::Class, None);
        let b = table.define("B", ClassKind::Class, Some(a));
        let c = table.define("C", ClassKind::Class, Some(b));

        let chain: Vec<_> = table.ancestors(c).collect();
        assert_eq!(chain, vec![c, b, a]);
    }
}
