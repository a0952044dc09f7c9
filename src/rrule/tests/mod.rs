#![cfg(test)]

mod common;
mod generate;
mod rfc_tests;
