//! Berry parser: recursive descent over the token stream, producing a
//! mutable AST.
//!
//! Parsing a file also declares every top-level name in the module's global
//! table, so a later definition can be referenced by an earlier one. Locals
//! get symbols here too but are only bound into scopes by the checker.
//!
//! - [`ast`]: definitions, statements, expressions
//! - [`symbol`]: the symbol arena
//! - [`module`]: files, definitions and the global table of one module

pub mod ast;
pub mod error;
pub mod module;
mod parser;
pub mod symbol;

use berry_common::diagnostic::{Diagnostic, Reporter};
use berry_common::source::SourceFile;

pub use error::ParseError;
pub use module::Module;

/// Parse one source file into `module`.
///
/// Definitions are appended to `module.defs` and top-level names declared
/// in `module.globals`. Duplicate names and duplicate metadata tags are
/// reported and the offending definition skipped; any lexical or syntax
/// error stops the file there (definitions before it are kept). Every
/// problem is reported through `reporter`; the fatal one, if any, is also
/// returned.
pub fn parse_file(
    module: &mut Module,
    file: SourceFile,
    reporter: &Reporter,
) -> Result<(), ParseError> {
    tracing::debug!(module = %module.name, path = %file.display_path, "parsing");
    let result = parser::Parser::new(module, &file, reporter).parse_defs();
    if let Err(err) = &result {
        reporter.report(Diagnostic::new(
            err.category(),
            err.message.clone(),
            &module.name,
            &file,
            err.span,
        ));
    }
    module.files.push(file);
    result
}
