//! Edge adapters. The CSV action script is the scriptable stand-in for the
//! UI collaborator; the engine itself never reads or writes these formats.

pub mod csv;
