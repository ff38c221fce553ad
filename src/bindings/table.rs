//! `Table` class bindings.

use super::args::Arg;
use super::util::no_args;
use crate::domain::table::{to_element, Table};
use crate::impl_bound_data;
use crate::scripting::{ScriptRuntime, Value, VmResult};

impl_bound_data!(Table, TABLE_TYPE, "Table");

/// Decodes `x|yz`-style dimensions, missing ones defaulting to `default`.
fn dimensions(vm: &ScriptRuntime, args: &[Value], default: i32) -> VmResult<(i32, i32, i32)> {
    let (mut x, mut y, mut z) = (0, default, default);
    vm.get_args(
        args,
        "i|ii",
        &mut [Arg::Int(&mut x), Arg::Int(&mut y), Arg::Int(&mut z)],
    )?;
    Ok((x, y, z))
}

fn initialize(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let (x, y, z) = dimensions(vm, args, 1)?;
    vm.set_private_data(this, Table::new(x, y, z))?;
    Ok(Value::Nil)
}

fn initialize_copy(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut original = Value::Nil;
    vm.get_args(args, "o", &mut [Arg::Object(&mut original)])?;
    let table = vm.get_private_data::<Table>(&original)?.clone();
    vm.set_private_data(this, table)?;
    Ok(this.clone())
}

fn resize(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let (x, y, z) = dimensions(vm, args, 1)?;
    vm.get_private_data::<Table>(this)?.resize(x, y, z);
    Ok(Value::Nil)
}

fn xsize(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Int(vm.get_private_data::<Table>(this)?.xsize() as i64))
}

fn ysize(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Int(vm.get_private_data::<Table>(this)?.ysize() as i64))
}

fn zsize(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Int(vm.get_private_data::<Table>(this)?.zsize() as i64))
}

fn get(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let (x, y, z) = dimensions(vm, args, 0)?;
    let value = vm.get_private_data::<Table>(this)?.get(x, y, z);
    Ok(value.map(|v| Value::Int(i64::from(v))).unwrap_or_default())
}

fn set(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    // 最后一个参数是写入的值
    let format = match args.len() {
        0..=2 => "ii",
        3 => "iii",
        _ => "iiii",
    };
    let mut coords = [0; 3];
    let mut value = 0;
    let [x, y, z] = &mut coords;
    let mut outs = match format {
        "ii" => vec![Arg::Int(x), Arg::Int(&mut value)],
        "iii" => vec![Arg::Int(x), Arg::Int(y), Arg::Int(&mut value)],
        _ => vec![Arg::Int(x), Arg::Int(y), Arg::Int(z), Arg::Int(&mut value)],
    };
    vm.get_args(args, format, &mut outs)?;
    drop(outs);

    let [x, y, z] = coords;
    vm.get_private_data::<Table>(this)?.set(x, y, z, to_element(i64::from(value)));
    Ok(Value::Int(i64::from(value)))
}

pub fn register(vm: &mut ScriptRuntime) {
    let object = vm.core().object;
    let class = vm.define_class("Table", object);
    vm.define_alloc_func(class, &TABLE_TYPE);

    vm.define_method(class, "initialize", initialize);
    vm.define_method(class, "initialize_copy", initialize_copy);
    vm.define_method(class, "resize", resize);
    vm.define_method(class, "xsize", xsize);
    vm.define_method(class, "ysize", ysize);
    vm.define_method(class, "zsize", zsize);
    vm.define_method(class, "[]", get);
    vm.define_method(class, "[]=", set);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(vm: &mut ScriptRuntime, sizes: &[Value]) -> Value {
        register(vm);
        let class = vm.const_lookup("Table").unwrap();
        vm.call(&class, "new", sizes).unwrap()
    }

    #[test]
    fn test_dimensions_default_to_one() {
        let mut vm = ScriptRuntime::new();
        let t = table(&mut vm, &[Value::Int(4)]);
        assert_eq!(vm.call(&t, "xsize", &[]).unwrap(), Value::Int(4));
        assert_eq!(vm.call(&t, "ysize", &[]).unwrap(), Value::Int(1));
        assert_eq!(vm.call(&t, "zsize", &[]).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_index_and_assign() {
        let mut vm = ScriptRuntime::new();
        let t = table(&mut vm, &[Value::Int(3), Value::Int(2), Value::Int(2)]);
        vm.call(&t, "[]=", &[Value::Int(2), Value::Int(1), Value::Int(1), Value::Int(70000)])
            .unwrap();
        assert_eq!(
            vm.call(&t, "[]", &[Value::Int(2), Value::Int(1), Value::Int(1)]).unwrap(),
            Value::Int(4464)
        );
        vm.call(&t, "[]=", &[Value::Int(1), Value::Int(-5)]).unwrap();
        assert_eq!(vm.call(&t, "[]", &[Value::Int(1)]).unwrap(), Value::Int(-5));
        assert_eq!(vm.call(&t, "[]", &[Value::Int(3)]).unwrap(), Value::Nil);
        assert!(vm.call(&t, "[]=", &[Value::Int(1)]).is_err());
    }

    #[test]
    fn test_resize_and_negative_sizes() {
        let mut vm = ScriptRuntime::new();
        let t = table(&mut vm, &[Value::Int(2), Value::Int(2)]);
        vm.call(&t, "[]=", &[Value::Int(0), Value::Int(0), Value::Int(7)]).unwrap();
        vm.call(&t, "resize", &[Value::Int(5), Value::Int(-1)]).unwrap();
        assert_eq!(vm.call(&t, "ysize", &[]).unwrap(), Value::Int(0));
        assert_eq!(vm.call(&t, "[]", &[Value::Int(0), Value::Int(0)]).unwrap(), Value::Nil);
    }

    #[test]
    fn test_clone_copies_data() {
        let mut vm = ScriptRuntime::new();
        let t = table(&mut vm, &[Value::Int(2)]);
        vm.call(&t, "[]=", &[Value::Int(1), Value::Int(9)]).unwrap();
        let copy = vm.call(&t, "clone", &[]).unwrap();
        vm.call(&t, "[]=", &[Value::Int(1), Value::Int(0)]).unwrap();
        assert_eq!(vm.call(&copy, "[]", &[Value::Int(1)]).unwrap(), Value::Int(9));
    }
}
