// cvar.rs — named tunables read by the play code (developer, secnode_max)

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::common::com_printf;
use crate::doomdef::CVAR_NOSET;

#[derive(Clone, Debug)]
pub struct Cvar {
    pub name: String,
    pub string: String,
    pub flags: i32,
    pub value: f32,
}

/// Registry of cvars, looked up by name.
#[derive(Default)]
pub struct CvarContext {
    vars: Vec<Cvar>,
    index: HashMap<String, usize>,
}

impl CvarContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_var(&self, name: &str) -> Option<&Cvar> {
        self.index.get(name).map(|&i| &self.vars[i])
    }

    /// Value of `name`, 0 when unregistered.
    pub fn variable_value(&self, name: &str) -> f32 {
        self.find_var(name).map_or(0.0, |v| v.value)
    }

    /// Register `name` with `value` unless it exists; an existing cvar
    /// keeps its value and gains `flags`.
    pub fn get(&mut self, name: &str, value: &str, flags: i32) -> usize {
        if let Some(&i) = self.index.get(name) {
            self.vars[i].flags |= flags;
            return i;
        }
        self.vars.push(Cvar {
            name: name.to_string(),
            string: value.to_string(),
            flags,
            value: value.parse().unwrap_or(0.0),
        });
        let i = self.vars.len() - 1;
        self.index.insert(name.to_string(), i);
        i
    }

    /// Change a cvar, creating it if needed. NOSET cvars refuse.
    pub fn set(&mut self, name: &str, value: &str) {
        let i = match self.index.get(name) {
            Some(&i) => i,
            None => {
                self.get(name, value, 0);
                return;
            }
        };
        let var = &mut self.vars[i];
        if var.flags & CVAR_NOSET != 0 {
            com_printf(&format!("{} is write protected.\n", name));
            return;
        }
        var.string = value.to_string();
        var.value = value.parse().unwrap_or(0.0);
    }
}

// ============================================================
// Process-wide registry
// ============================================================

static CVAR_CTX: Mutex<Option<CvarContext>> = Mutex::new(None);

pub fn cvar_init() {
    *CVAR_CTX.lock() = Some(CvarContext::new());
}

pub fn cvar_shutdown() {
    *CVAR_CTX.lock() = None;
}

pub fn cvar_get(name: &str, value: &str, flags: i32) -> Option<usize> {
    CVAR_CTX.lock().as_mut().map(|c| c.get(name, value, flags))
}

pub fn cvar_set(name: &str, value: &str) {
    if let Some(c) = CVAR_CTX.lock().as_mut() {
        c.set(name, value);
    }
}

pub fn cvar_variable_value(name: &str) -> f32 {
    CVAR_CTX.lock().as_ref().map_or(0.0, |c| c.variable_value(name))
}

/// Like `cvar_variable_value`, but `default` when the registry is down or
/// `name` was never registered.
pub fn cvar_value_or(name: &str, default: f32) -> f32 {
    CVAR_CTX
        .lock()
        .as_ref()
        .and_then(|c| c.find_var(name).map(|v| v.value))
        .unwrap_or(default)
}
