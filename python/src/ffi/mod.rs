//! ffi/mod.rs
//! Python module definition.

use std::fs::OpenOptions;
use std::str::FromStr;
use std::sync::Once;

use log::LevelFilter;
use pyo3::exceptions::{PyOSError, PyValueError};
use pyo3::prelude::*;

mod buffers;
mod calls;
mod classes;
mod errors;
mod state;

use deflate_bridge_core::constants::{
    format_tags, COMPRESS_ACQUISITION_FAILED, INSUFFICIENT_SPACE_FLAG, PRODUCED_MASK,
};

static INIT_LOGGER: Once = Once::new();

/// Routes the core's `log` output to stderr, or to `log_file` in append mode.
/// Only the first call has an effect.
#[pyfunction]
#[pyo3(name = "enable_verbose_logging", signature = (level = "info", log_file = None))]
pub fn enable_verbose_logging_py(level: &str, log_file: Option<String>) -> PyResult<()> {
    let filter = LevelFilter::from_str(level)
        .map_err(|_| PyValueError::new_err(format!("unknown log level: {level}")))?;
    let target = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(&path)
                .map_err(|e| PyOSError::new_err(format!("could not open {path}: {e}")))?;
            Some(env_logger::Target::Pipe(Box::new(file)))
        }
        None => None,
    };

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.is_test(false);
        builder.filter_level(filter);
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
        });
        if let Some(target) = target {
            builder.target(target);
        }
        let _ = builder.try_init();
    });
    Ok(())
}

pub fn register(py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Low-level call surface
    m.add_class::<calls::PyCompressorHandle>()?;
    m.add_class::<calls::PyDecompressorHandle>()?;
    m.add_function(wrap_pyfunction!(calls::crc32, m)?)?;
    m.add_function(wrap_pyfunction!(calls::adler32, m)?)?;
    m.add_function(wrap_pyfunction!(calls::create_compressor, m)?)?;
    m.add_function(wrap_pyfunction!(calls::destroy_compressor, m)?)?;
    m.add_function(wrap_pyfunction!(calls::compress, m)?)?;
    m.add_function(wrap_pyfunction!(calls::create_decompressor, m)?)?;
    m.add_function(wrap_pyfunction!(calls::destroy_decompressor, m)?)?;
    m.add_function(wrap_pyfunction!(calls::decompress, m)?)?;
    m.add_function(wrap_pyfunction!(calls::compress_bound, m)?)?;
    m.add_function(wrap_pyfunction!(calls::buffer_size_hint, m)?)?;

    // Classes
    m.add_class::<classes::PyCompressor>()?;
    m.add_class::<classes::PyDecompressor>()?;
    m.add_class::<classes::PyCrc32>()?;
    m.add_class::<classes::PyAdler32>()?;

    // Configuration, pool and logging
    m.add_function(wrap_pyfunction!(state::configure, m)?)?;
    m.add_function(wrap_pyfunction!(state::config, m)?)?;
    m.add_function(wrap_pyfunction!(state::drain_pool, m)?)?;
    m.add_function(wrap_pyfunction!(enable_verbose_logging_py, m)?)?;

    m.add("DataFormatError", py.get_type_bound::<errors::DataFormatError>())?;

    m.add("FORMAT_DEFLATE", format_tags::DEFLATE)?;
    m.add("FORMAT_ZLIB", format_tags::ZLIB)?;
    m.add("FORMAT_GZIP", format_tags::GZIP)?;
    m.add("COMPRESS_ACQUISITION_FAILED", COMPRESS_ACQUISITION_FAILED)?;
    m.add("INSUFFICIENT_SPACE_FLAG", INSUFFICIENT_SPACE_FLAG)?;
    m.add("PRODUCED_MASK", PRODUCED_MASK)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
