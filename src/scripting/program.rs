use std::fmt;

use super::exception::VmResult;
use super::runtime::ScriptRuntime;
use super::value::Value;

/// Body of a script section.
pub type SectionBody = Box<dyn Fn(&mut ScriptRuntime) -> VmResult<Value>>;

/// A named script section, the unit a game's script list is made of.
pub struct ScriptSection {
    pub name: String,
    body: SectionBody,
}

impl ScriptSection {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut ScriptRuntime) -> VmResult<Value> + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(body),
        }
    }

    pub fn run(&self, vm: &mut ScriptRuntime) -> VmResult<Value> {
        vm.run_frame(&self.name, |vm| (self.body)(vm))
    }
}

impl fmt::Debug for ScriptSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptSection")
            .field("name", &self.name)
            .finish()
    }
}

/// Ordered list of script sections.
#[derive(Debug, Default)]
pub struct ScriptProgram {
    sections: Vec<ScriptSection>,
}

impl ScriptProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a section (builder style).
    pub fn section<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut ScriptRuntime) -> VmResult<Value> + 'static,
    {
        self.push(ScriptSection::new(name, body));
        self
    }

    pub fn push(&mut self, section: ScriptSection) {
        self.sections.push(section);
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn sections(&self) -> impl Iterator<Item = &ScriptSection> {
        self.sections.iter()
    }

    /// Runs every section in order, stopping at the first unwind.
    pub fn run(&self, vm: &mut ScriptRuntime) -> VmResult<()> {
        for section in &self.sections {
            tracing::trace!(target: "script", section = %section.name, "running section");
            section.run(vm)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_sections_run_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = log.clone();
        let second = log.clone();
        let program = ScriptProgram::new()
            .section("Vocab", move |_| {
                first.borrow_mut().push("Vocab");
                Ok(Value::Nil)
            })
            .section("Main", move |_| {
                second.borrow_mut().push("Main");
                Ok(Value::Nil)
            });

        let mut vm = ScriptRuntime::new();
        program.run(&mut vm).unwrap();
        assert_eq!(*log.borrow(), vec!["Vocab", "Main"]);
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn test_error_stops_program_with_section_backtrace() {
        let program = ScriptProgram::new()
            .section("Game_Temp", |vm| {
                let type_error = vm.core().type_error;
                Err(vm.raise(type_error, "no implicit conversion"))
            })
            .section("Main", |_| panic!("must not run"));

        let mut vm = ScriptRuntime::new();
        let err = program.run(&mut vm).unwrap_err();
        assert_eq!(err.exception().unwrap().backtrace, vec!["Game_Temp".to_string()]);
    }
}
