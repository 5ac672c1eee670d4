pub mod action_reader;
pub mod snapshot_writer;
