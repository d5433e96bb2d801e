//! Compiler and linker command construction.

pub mod compile;
pub mod shlib;

pub use compile::CompileCommand;
pub use shlib::SharedLibrary;
