//! Tests for the session service

#[cfg(test)]
mod mocks;
