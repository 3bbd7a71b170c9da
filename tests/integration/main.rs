//! Integration tests for Proxy-Fanout
//!
//! Every live proxy is a wiremock server: reqwest sends it the absolute-form
//! request for the poll host, so nothing ever leaves the machine.

mod run_tests;
