//! Integration tests for the imprint digest pipeline

mod build_failures;
mod manifest_format;
mod test_utils;
mod transform_contract;
