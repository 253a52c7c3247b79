mod dashboard_tests;
mod data_tests;
