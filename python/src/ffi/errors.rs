//! ffi/errors.rs
//! BridgeError → Python exception mapping.

use deflate_bridge_core::types::BridgeError;
use pyo3::create_exception;
use pyo3::exceptions::{PyIndexError, PyMemoryError, PyTypeError, PyValueError};
use pyo3::PyErr;

create_exception!(
    deflate_bridge,
    DataFormatError,
    PyValueError,
    "Input is not valid for the declared framing."
);

pub fn into_py_err(err: BridgeError) -> PyErr {
    let msg = err.to_string();
    match err {
        BridgeError::AcquisitionFailure { .. } | BridgeError::HandleAllocation { .. } => {
            PyMemoryError::new_err(msg)
        }
        BridgeError::MalformedInput { .. } => DataFormatError::new_err(msg),
        BridgeError::OutOfBounds { .. } => PyIndexError::new_err(msg),
        BridgeError::ReadOnlyDestination => PyTypeError::new_err(msg),
        _ => PyValueError::new_err(msg),
    }
}
