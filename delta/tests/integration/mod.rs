mod consumer_test;
mod delete_test;
mod range_delete_test;
mod write_test;
