//! Return-value slot binding and write-back of the caller's parameter list
//!
//! Procedure and scalar function calls always execute with exactly one
//! return-value parameter. When the caller supplied one it is used as is;
//! otherwise a nameless slot is appended for the call and dropped again
//! afterwards, so the caller's list never grows an entry it did not ask for.

use dbcall_core::{Parameter, Value};

/// Where the bound return-value parameter came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnSlotOrigin {
    /// Part of the caller's list; echoed back after the call
    CallerSupplied,
    /// Appended for the call only; consumed internally
    Synthesized,
}

/// The return-value parameter bound for one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnSlot {
    /// Position of the slot in the bound parameter list
    pub index: usize,
    pub origin: ReturnSlotOrigin,
}

/// Outcome of reconciling a call's bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    /// The routine's return code, `None` when the server left it NULL
    pub return_value: Option<i32>,
    /// The caller's parameter list with server-assigned values applied
    pub parameters: Vec<Parameter>,
}

/// Make sure `parameters` holds a return-value slot and report where it is
///
/// The first `ReturnValue` parameter wins when the caller supplied several.
pub fn bind_return_slot(parameters: &mut Vec<Parameter>) -> ReturnSlot {
    if let Some(index) = parameters.iter().position(Parameter::is_return_value) {
        return ReturnSlot {
            index,
            origin: ReturnSlotOrigin::CallerSupplied,
        };
    }

    parameters.push(Parameter::return_value());
    ReturnSlot {
        index: parameters.len() - 1,
        origin: ReturnSlotOrigin::Synthesized,
    }
}

/// Read the return code out of `bound` and rebuild the caller's list
pub fn reconcile(mut bound: Vec<Parameter>, slot: ReturnSlot) -> Reconciled {
    let return_value = match slot.origin {
        ReturnSlotOrigin::CallerSupplied => bound
            .get(slot.index)
            .and_then(|p| return_code(p.value())),
        ReturnSlotOrigin::Synthesized => {
            if slot.index < bound.len() {
                let synthesized = bound.remove(slot.index);
                return_code(synthesized.value())
            } else {
                None
            }
        }
    };

    Reconciled {
        return_value,
        parameters: bound,
    }
}

fn return_code(value: &Value) -> Option<i32> {
    if value.is_null() {
        return None;
    }

    match value.as_i64().map(i32::try_from) {
        Some(Ok(code)) => Some(code),
        _ => {
            tracing::warn!(value = %value, "return value is not a 32-bit integer, ignoring it");
            None
        }
    }
}
