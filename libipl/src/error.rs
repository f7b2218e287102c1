extern crate miette;
extern crate thiserror;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ExecutableError {
    #[error("malformed DOL header (shorter than 256 bytes or no section with a nonzero address)")]
    #[diagnostic(code(libipl::malformed_header))]
    MalformedHeader,

    #[error("section data out of bounds (offset {offset:?}, size {size:?}, file is {file_len:?} bytes)")]
    #[diagnostic(code(libipl::section_out_of_bounds))]
    SectionOutOfBounds {
        offset: usize,
        size: usize,
        file_len: usize,
    },
}

#[derive(Error, Diagnostic, Debug)]
pub enum ContainerError {
    #[error("no valid UF2 records in container ({file_len:?} bytes)")]
    #[diagnostic(code(libipl::truncated_container))]
    TruncatedContainer { file_len: usize },

    #[error("assembled firmware does not start with the IPLBOOT signature")]
    #[diagnostic(code(libipl::missing_marker))]
    MissingMarker,

    #[error("declared payload size out of bounds (declared {declared:?} bytes, assembled {available:?} bytes)")]
    #[diagnostic(code(libipl::declared_size))]
    DeclaredSizeOutOfBounds { declared: usize, available: usize },
}

#[derive(Error, Diagnostic, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    #[diagnostic(code(libipl::executable_error))]
    Executable(#[from] ExecutableError),

    #[error(transparent)]
    #[diagnostic(code(libipl::container_error))]
    Container(#[from] ContainerError),

    #[error("invalid entry point and base address (0x{entry:08X}:0x{base:08X})")]
    #[diagnostic(code(libipl::invalid_address_range))]
    InvalidAddressRange { entry: u32, base: u32 },
}
