mod lifecycle_tests;
mod pay_tests;
mod visibility_tests;
