//! Integration test modules.

mod batch_test;
mod mailer_test;
mod pipeline_test;
mod workbook_test;
