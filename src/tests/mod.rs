mod common;

mod score_tests;
