//! Object heap and typed native data.
//!
//! Every script object carries a data slot. Bound classes fill it with a boxed native value
//! tagged by a process-wide [`BoundType`] descriptor; unwrapping checks the descriptor by
//! address before handing out a reference.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use super::exception::{ScriptException, Unwind, VmResult};
use super::runtime::ScriptRuntime;
use super::value::{ClassId, ObjectId, SymbolId, Value};

/// Maps a parent's native data to one of its fields.
pub type Projection = fn(&mut NativeData) -> Option<&mut NativeData>;

/// Type-erased native data held by an object.
pub type NativeData = dyn Any + 'static;

/// Descriptor for a family of native objects.
pub struct BoundType {
    pub name: &'static str,
    free: fn(Box<dyn Any>),
}

impl BoundType {
    pub const fn new<T: Any>(name: &'static str) -> Self {
        Self {
            name,
            free: free_data::<T>,
        }
    }

    /// Runs the destructor for data owned by an object of this type.
    pub fn finalize(&self, data: Box<dyn Any>) {
        (self.free)(data)
    }

    /// Lowercased name used in disposed-access messages.
    pub fn label(&self) -> String {
        self.name.to_lowercase()
    }
}

impl fmt::Debug for BoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundType").field("name", &self.name).finish()
    }
}

impl PartialEq for BoundType {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

fn free_data<T: Any>(data: Box<dyn Any>) {
    match data.downcast::<T>() {
        Ok(value) => {
            tracing::trace!(target: "scripting", ty = std::any::type_name::<T>(), "freeing native data");
            drop(value);
        }
        Err(other) => drop(other),
    }
}

/// Native types that can live inside a script object.
pub trait BoundData: Any {
    fn bound_type() -> &'static BoundType;
}

/// State of an object's native data slot.
pub enum DataState {
    /// Allocated, `initialize` has not stored data yet.
    Empty,
    Live(Box<dyn Any>),
    /// Borrowed view of a field inside another object's data.
    Alias {
        parent: ObjectId,
        project: Projection,
    },
    Disposed,
}

impl fmt::Debug for DataState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataState::Empty => f.write_str("Empty"),
            DataState::Live(_) => f.write_str("Live"),
            DataState::Alias { parent, .. } => f.debug_struct("Alias").field("parent", parent).finish(),
            DataState::Disposed => f.write_str("Disposed"),
        }
    }
}

#[derive(Debug)]
pub struct RObject {
    pub class: ClassId,
    pub(crate) bound: Option<&'static BoundType>,
    pub(crate) ivars: HashMap<SymbolId, Value>,
    pub(crate) data: DataState,
}

impl RObject {
    pub fn new(class: ClassId, bound: Option<&'static BoundType>) -> Self {
        Self {
            class,
            bound,
            ivars: HashMap::new(),
            data: DataState::Empty,
        }
    }

    pub fn data(&self) -> &DataState {
        &self.data
    }

    /// Hands Live data to the descriptor's destructor.
    pub(crate) fn finalize(self) {
        if let (DataState::Live(data), Some(ty)) = (self.data, self.bound) {
            ty.finalize(data);
        }
    }
}

#[derive(Debug)]
enum Slot {
    Vacant { generation: u32 },
    Occupied { generation: u32, object: RObject },
}

/// Generational arena holding every live script object.
#[derive(Debug, Default)]
pub struct ObjectStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: RObject) -> ObjectId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            let generation = match slot {
                Slot::Vacant { generation } => *generation,
                Slot::Occupied { generation, .. } => generation.wrapping_add(1),
            };
            *slot = Slot::Occupied { generation, object };
            return ObjectId { index, generation };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot::Occupied {
            generation: 0,
            object,
        });
        ObjectId {
            index,
            generation: 0,
        }
    }

    pub fn get(&self, id: ObjectId) -> Option<&RObject> {
        match self.slots.get(id.index as usize)? {
            Slot::Occupied { generation, object } if *generation == id.generation => Some(object),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut RObject> {
        match self.slots.get_mut(id.index as usize)? {
            Slot::Occupied { generation, object } if *generation == id.generation => Some(object),
            _ => None,
        }
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<RObject> {
        let slot = self.slots.get_mut(id.index as usize)?;
        match slot {
            Slot::Occupied { generation, .. } if *generation == id.generation => {}
            _ => return None,
        }
        let vacant = Slot::Vacant {
            generation: id.generation.wrapping_add(1),
        };
        match std::mem::replace(slot, vacant) {
            Slot::Occupied { object, .. } => {
                self.free.push(id.index);
                self.live -= 1;
                Some(object)
            }
            Slot::Vacant { .. } => None,
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Occupied { generation, .. } => Some(ObjectId {
                    index: index as u32,
                    generation: *generation,
                }),
                Slot::Vacant { .. } => None,
            })
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

fn binding_defect(class: ClassId, ty: &BoundType) -> Unwind {
    Unwind::Raise(ScriptException {
        class,
        class_name: "fatal".to_string(),
        message: format!("{} data does not match its descriptor", ty.name),
        backtrace: Vec::new(),
    })
}

// Wrapping, unwrapping and disposal.
impl ScriptRuntime {
    /// Allocates an object of `class` owning `data`.
    pub fn wrap_object<T: BoundData>(&mut self, data: T, class: ClassId) -> Value {
        let mut object = RObject::new(class, Some(T::bound_type()));
        object.data = DataState::Live(Box::new(data));
        Value::Object(self.objects.insert(object))
    }

    /// Stores native data in an allocated object, finalizing anything it held before.
    pub fn set_private_data<T: BoundData>(&mut self, value: &Value, data: T) -> VmResult<()> {
        let ty = T::bound_type();
        let id = self.expect_object(value, ty)?;
        let bound = self.objects.get(id).and_then(|object| object.bound);
        match bound {
            Some(existing) if existing != ty => return Err(self.wrong_data_type(value, ty)),
            _ => {}
        }
        let Some(object) = self.objects.get_mut(id) else {
            return Err(self.reclaimed());
        };
        object.bound = Some(ty);
        let previous = std::mem::replace(&mut object.data, DataState::Live(Box::new(data)));
        if let DataState::Live(old) = previous {
            ty.finalize(old);
        }
        Ok(())
    }

    /// Typed access to an object's native data.
    pub fn get_private_data<T: BoundData>(&mut self, value: &Value) -> VmResult<&mut T> {
        let fatal = self.core.fatal;
        let data = self.unwrap_data(value, T::bound_type())?;
        data.downcast_mut::<T>()
            .ok_or_else(|| binding_defect(fatal, T::bound_type()))
    }

    /// Descriptor-checked access to an object's native data.
    ///
    /// Fails with a type error when the value is not an object of `ty`, and with the
    /// disposed-access error when the object (or an alias's parent) has been disposed.
    pub fn unwrap_data(
        &mut self,
        value: &Value,
        ty: &'static BoundType,
    ) -> VmResult<&mut NativeData> {
        let (owner, project) = self.resolve_data(value, ty)?;
        let fatal = self.core.fatal;
        let data = match self.objects.get_mut(owner).map(|object| &mut object.data) {
            Some(DataState::Live(data)) => data.as_mut(),
            _ => return Err(binding_defect(fatal, ty)),
        };
        match project {
            Some(project) => project(data).ok_or_else(|| binding_defect(fatal, ty)),
            None => Ok(data),
        }
    }

    /// Creates a handle aliasing a field of `parent`'s data and stores it in `ivar` on the parent.
    pub fn wrap_property<T: BoundData>(
        &mut self,
        parent: &Value,
        project: Projection,
        ivar: &str,
        class: ClassId,
    ) -> VmResult<Value> {
        let Value::Object(parent_id) = parent else {
            return Err(self.raise(
                self.core.type_error,
                format!("{} cannot own properties", self.inspect(parent)),
            ));
        };
        let mut object = RObject::new(class, Some(T::bound_type()));
        object.data = DataState::Alias {
            parent: *parent_id,
            project,
        };
        let handle = Value::Object(self.objects.insert(object));
        self.ivar_set(parent, ivar, handle.clone())?;
        Ok(handle)
    }

    /// Releases an object's native data. Returns `false` when it was already disposed.
    pub fn dispose(&mut self, value: &Value) -> VmResult<bool> {
        let Value::Object(id) = value else {
            return Err(self.raise(
                self.core.type_error,
                format!("cannot dispose {}", self.inspect(value)),
            ));
        };
        let Some(object) = self.objects.get_mut(*id) else {
            return Err(self.reclaimed());
        };
        let bound = object.bound;
        match std::mem::replace(&mut object.data, DataState::Disposed) {
            DataState::Disposed => Ok(false),
            DataState::Live(data) => {
                if let Some(ty) = bound {
                    tracing::trace!(target: "bindings", ty = ty.name, "disposed");
                    ty.finalize(data);
                }
                Ok(true)
            }
            DataState::Empty | DataState::Alias { .. } => Ok(true),
        }
    }

    pub fn is_disposed(&self, value: &Value) -> VmResult<bool> {
        let Value::Object(id) = value else {
            return Ok(false);
        };
        match self.objects.get(*id) {
            Some(object) => Ok(matches!(object.data, DataState::Disposed)),
            None => Err(self.reclaimed()),
        }
    }

    fn expect_object(&self, value: &Value, ty: &BoundType) -> VmResult<ObjectId> {
        match value {
            Value::Object(id) if self.objects.get(*id).is_some() => Ok(*id),
            Value::Object(_) => Err(self.reclaimed()),
            other => Err(self.wrong_data_type(other, ty)),
        }
    }

    fn resolve_data(
        &self,
        value: &Value,
        ty: &'static BoundType,
    ) -> VmResult<(ObjectId, Option<Projection>)> {
        let id = self.expect_object(value, ty)?;
        let Some(object) = self.objects.get(id) else {
            return Err(self.reclaimed());
        };
        match object.bound {
            Some(bound) if bound == ty => {}
            _ => return Err(self.wrong_data_type(value, ty)),
        }
        match &object.data {
            DataState::Live(_) => Ok((id, None)),
            DataState::Disposed => Err(self.raise_disposed_access(ty)),
            DataState::Empty => Err(self.raise(
                self.core.type_error,
                format!("uninitialized {}", ty.name),
            )),
            DataState::Alias { parent, project } => match self.objects.get(*parent) {
                Some(owner) => match &owner.data {
                    DataState::Live(_) => Ok((*parent, Some(*project))),
                    _ => Err(self.raise_disposed_access(owner.bound.unwrap_or(ty))),
                },
                None => Err(self.reclaimed()),
            },
        }
    }

    fn wrong_data_type(&self, value: &Value, ty: &BoundType) -> Unwind {
        self.raise(
            self.core.type_error,
            format!(
                "wrong argument type {} (expected {})",
                self.class_name_of(value),
                ty.name
            ),
        )
    }

    pub(crate) fn reclaimed(&self) -> Unwind {
        self.raise(self.core.runtime_error, "reference to a reclaimed object")
    }
}
