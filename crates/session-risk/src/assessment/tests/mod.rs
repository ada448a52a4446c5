mod advisory;
mod common;
mod import;
