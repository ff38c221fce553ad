//! Disposable scene classes: `Bitmap`, `Sprite`, `Plane`, `Viewport`, `Window`, `Tilemap`.
//!
//! Each instance owns its native state until `dispose` (or collection). After disposal every
//! method except `dispose` and `disposed?` raises `disposed <type>`.

use super::args::Arg;
use super::util::{dispose, is_disposed, no_args, with_shared};
use crate::core::error::NativeError;
use crate::domain::scene::clamp_opacity;
use crate::domain::{Bitmap, Plane, Sprite, Tilemap, Viewport, Window};
use crate::impl_bound_data;
use crate::scripting::{BoundType, ClassId, ScriptRuntime, Value, VmResult};

impl_bound_data!(Bitmap, BITMAP_TYPE, "Bitmap");
impl_bound_data!(Sprite, SPRITE_TYPE, "Sprite");
impl_bound_data!(Plane, PLANE_TYPE, "Plane");
impl_bound_data!(Viewport, VIEWPORT_TYPE, "Viewport");
impl_bound_data!(Window, WINDOW_TYPE, "Window");
impl_bound_data!(Tilemap, TILEMAP_TYPE, "Tilemap");

/// Image extensions tried when a bitmap path has none.
const IMAGE_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".bmp"];

// ---- Bitmap ----

fn bitmap_initialize(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let bitmap = if args.len() == 1 {
        let mut path = "";
        vm.get_args(args, "z", &mut [Arg::Str(&mut path)])?;
        let found = with_shared(vm, true, |s| {
            s.filesystem.is_file(path)
                || IMAGE_EXTENSIONS
                    .iter()
                    .any(|ext| s.filesystem.is_file(&format!("{}{}", path, ext)))
        });
        if !found {
            return Err(vm.raise_native(NativeError::no_file(path)));
        }
        Bitmap::from_file(path)
    } else {
        let (mut width, mut height) = (0, 0);
        vm.get_args(args, "ii", &mut [Arg::Int(&mut width), Arg::Int(&mut height)])?;
        Bitmap::new(width, height)
    };
    vm.set_private_data(this, bitmap)?;
    Ok(Value::Nil)
}

fn bitmap_width(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Int(i64::from(vm.get_private_data::<Bitmap>(this)?.width)))
}

fn bitmap_height(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    Ok(Value::Int(i64::from(vm.get_private_data::<Bitmap>(this)?.height)))
}

// ---- Viewport ----

fn viewport_initialize(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let (mut x, mut y) = (0, 0);
    let (mut width, mut height) = with_shared(vm, (640, 480), |s| {
        (s.graphics.width() as i32, s.graphics.height() as i32)
    });
    let given = vm.get_args(
        args,
        "|iiii",
        &mut [
            Arg::Int(&mut x),
            Arg::Int(&mut y),
            Arg::Int(&mut width),
            Arg::Int(&mut height),
        ],
    )?;
    if given != 0 && given != 4 {
        return Err(vm.raise_native(NativeError::argument(format!(
            "wrong number of arguments (given {}, expected 0 or 4)",
            given
        ))));
    }
    vm.set_private_data(this, Viewport::new(x, y, width, height))?;
    Ok(Value::Nil)
}

int_attr!(Viewport, x, viewport_x, set_viewport_x);
int_attr!(Viewport, y, viewport_y, set_viewport_y);
int_attr!(Viewport, width, viewport_width, set_viewport_width);
int_attr!(Viewport, height, viewport_height, set_viewport_height);
int_attr!(Viewport, z, viewport_z, set_viewport_z);
int_attr!(Viewport, ox, viewport_ox, set_viewport_ox);
int_attr!(Viewport, oy, viewport_oy, set_viewport_oy);
bool_attr!(Viewport, visible, viewport_visible, set_viewport_visible);

/// Optional viewport argument: nil or a live `Viewport`.
fn viewport_arg(vm: &mut ScriptRuntime, args: &[Value]) -> VmResult<Value> {
    let mut viewport = Value::Nil;
    vm.get_args(args, "|o", &mut [Arg::Object(&mut viewport)])?;
    if !viewport.is_nil() {
        vm.get_private_data::<Viewport>(&viewport)?;
    }
    Ok(viewport)
}

/// `initialize(viewport = nil)` and the `viewport` reader for a child of a viewport.
macro_rules! viewport_child {
    ($ty:ty, $init:ident, $viewport:ident) => {
        fn $init(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
            let viewport = viewport_arg(vm, args)?;
            vm.set_private_data(this, <$ty>::default())?;
            vm.ivar_set(this, "viewport", viewport)?;
            Ok(Value::Nil)
        }

        fn $viewport(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
            no_args(vm, args)?;
            vm.get_private_data::<$ty>(this)?;
            Ok(vm.ivar_get(this, "viewport"))
        }
    };
}

// ---- Sprite ----

viewport_child!(Sprite, sprite_initialize, sprite_viewport);
int_attr!(Sprite, x, sprite_x, set_sprite_x);
int_attr!(Sprite, y, sprite_y, set_sprite_y);
int_attr!(Sprite, z, sprite_z, set_sprite_z);
int_attr!(Sprite, ox, sprite_ox, set_sprite_ox);
int_attr!(Sprite, oy, sprite_oy, set_sprite_oy);
int_attr!(Sprite, opacity, sprite_opacity, set_sprite_opacity, clamp_opacity);
bool_attr!(Sprite, visible, sprite_visible, set_sprite_visible);

fn sprite_bitmap(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    no_args(vm, args)?;
    vm.get_private_data::<Sprite>(this)?;
    Ok(vm.ivar_get(this, "bitmap"))
}

fn set_sprite_bitmap(vm: &mut ScriptRuntime, this: &Value, args: &[Value]) -> VmResult<Value> {
    let mut bitmap = Value::Nil;
    vm.get_args(args, "o", &mut [Arg::Object(&mut bitmap)])?;
    vm.get_private_data::<Sprite>(this)?;
    if !bitmap.is_nil() {
        vm.get_private_data::<Bitmap>(&bitmap)?;
    }
    vm.ivar_set(this, "bitmap", bitmap.clone())?;
    Ok(bitmap)
}

// ---- Plane ----

viewport_child!(Plane, plane_initialize, plane_viewport);
int_attr!(Plane, z, plane_z, set_plane_z);
int_attr!(Plane, ox, plane_ox, set_plane_ox);
int_attr!(Plane, oy, plane_oy, set_plane_oy);
int_attr!(Plane, opacity, plane_opacity, set_plane_opacity, clamp_opacity);
bool_attr!(Plane, visible, plane_visible, set_plane_visible);

// ---- Window ----

viewport_child!(Window, window_initialize, window_viewport);
int_attr!(Window, x, window_x, set_window_x);
int_attr!(Window, y, window_y, set_window_y);
int_attr!(Window, width, window_width, set_window_width);
int_attr!(Window, height, window_height, set_window_height);
int_attr!(Window, z, window_z, set_window_z);
int_attr!(Window, opacity, window_opacity, set_window_opacity, clamp_opacity);
bool_attr!(Window, visible, window_visible, set_window_visible);
bool_attr!(Window, active, window_active, set_window_active);

// ---- Tilemap ----

viewport_child!(Tilemap, tilemap_initialize, tilemap_viewport);
int_attr!(Tilemap, ox, tilemap_ox, set_tilemap_ox);
int_attr!(Tilemap, oy, tilemap_oy, set_tilemap_oy);
bool_attr!(Tilemap, visible, tilemap_visible, set_tilemap_visible);

/// Defines a disposable class with its allocator, `dispose` and `disposed?`.
fn define_disposable(vm: &mut ScriptRuntime, name: &str, ty: &'static BoundType) -> ClassId {
    let object = vm.core().object;
    let class = vm.define_class(name, object);
    vm.define_alloc_func(class, ty);
    vm.define_method(class, "dispose", dispose);
    vm.define_method(class, "disposed?", is_disposed);
    class
}

pub fn register(vm: &mut ScriptRuntime) {
    let class = define_disposable(vm, "Bitmap", &BITMAP_TYPE);
    vm.define_method(class, "initialize", bitmap_initialize);
    vm.define_method(class, "width", bitmap_width);
    vm.define_method(class, "height", bitmap_height);

    let class = define_disposable(vm, "Viewport", &VIEWPORT_TYPE);
    vm.define_method(class, "initialize", viewport_initialize);
    vm.define_method(class, "x", viewport_x);
    vm.define_method(class, "x=", set_viewport_x);
    vm.define_method(class, "y", viewport_y);
    vm.define_method(class, "y=", set_viewport_y);
    vm.define_method(class, "width", viewport_width);
    vm.define_method(class, "width=", set_viewport_width);
    vm.define_method(class, "height", viewport_height);
    vm.define_method(class, "height=", set_viewport_height);
    vm.define_method(class, "z", viewport_z);
    vm.define_method(class, "z=", set_viewport_z);
    vm.define_method(class, "ox", viewport_ox);
    vm.define_method(class, "ox=", set_viewport_ox);
    vm.define_method(class, "oy", viewport_oy);
    vm.define_method(class, "oy=", set_viewport_oy);
    vm.define_method(class, "visible", viewport_visible);
    vm.define_method(class, "visible=", set_viewport_visible);

    let class = define_disposable(vm, "Sprite", &SPRITE_TYPE);
    vm.define_method(class, "initialize", sprite_initialize);
    vm.define_method(class, "viewport", sprite_viewport);
    vm.define_method(class, "bitmap", sprite_bitmap);
    vm.define_method(class, "bitmap=", set_sprite_bitmap);
    vm.define_method(class, "x", sprite_x);
    vm.define_method(class, "x=", set_sprite_x);
    vm.define_method(class, "y", sprite_y);
    vm.define_method(class, "y=", set_sprite_y);
    vm.define_method(class, "z", sprite_z);
    vm.define_method(class, "z=", set_sprite_z);
    vm.define_method(class, "ox", sprite_ox);
    vm.define_method(class, "ox=", set_sprite_ox);
    vm.define_method(class, "oy", sprite_oy);
    vm.define_method(class, "oy=", set_sprite_oy);
    vm.define_method(class, "opacity", sprite_opacity);
    vm.define_method(class, "opacity=", set_sprite_opacity);
    vm.define_method(class, "visible", sprite_visible);
    vm.define_method(class, "visible=", set_sprite_visible);

    let class = define_disposable(vm, "Plane", &PLANE_TYPE);
    vm.define_method(class, "initialize", plane_initialize);
    vm.define_method(class, "viewport", plane_viewport);
    vm.define_method(class, "z", plane_z);
    vm.define_method(class, "z=", set_plane_z);
    vm.define_method(class, "ox", plane_ox);
    vm.define_method(class, "ox=", set_plane_ox);
    vm.define_method(class, "oy", plane_oy);
    vm.define_method(class, "oy=", set_plane_oy);
    vm.define_method(class, "opacity", plane_opacity);
    vm.define_method(class, "opacity=", set_plane_opacity);
    vm.define_method(class, "visible", plane_visible);
    vm.define_method(class, "visible=", set_plane_visible);

    let class = define_disposable(vm, "Window", &WINDOW_TYPE);
    vm.define_method(class, "initialize", window_initialize);
    vm.define_method(class, "viewport", window_viewport);
    vm.define_method(class, "x", window_x);
    vm.define_method(class, "x=", set_window_x);
    vm.define_method(class, "y", window_y);
    vm.define_method(class, "y=", set_window_y);
    vm.define_method(class, "width", window_width);
    vm.define_method(class, "width=", set_window_width);
    vm.define_method(class, "height", window_height);
    vm.define_method(class, "height=", set_window_height);
    vm.define_method(class, "z", window_z);
    vm.define_method(class, "z=", set_window_z);
    vm.define_method(class, "opacity", window_opacity);
    vm.define_method(class, "opacity=", set_window_opacity);
    vm.define_method(class, "visible", window_visible);
    vm.define_method(class, "visible=", set_window_visible);
    vm.define_method(class, "active", window_active);
    vm.define_method(class, "active=", set_window_active);

    let class = define_disposable(vm, "Tilemap", &TILEMAP_TYPE);
    vm.define_method(class, "initialize", tilemap_initialize);
    vm.define_method(class, "viewport", tilemap_viewport);
    vm.define_method(class, "ox", tilemap_ox);
    vm.define_method(class, "ox=", set_tilemap_ox);
    vm.define_method(class, "oy", tilemap_oy);
    vm.define_method(class, "oy=", set_tilemap_oy);
    vm.define_method(class, "visible", tilemap_visible);
    vm.define_method(class, "visible=", set_tilemap_visible);
}
