//! Stand-ins used when the `profiling` feature is off.

#![allow(dead_code)]

use std::time::Duration;

#[inline(always)]
pub fn init() {}

#[inline(always)]
pub fn shutdown() {}

#[inline(always)]
pub fn log_event<T>(_: T) {}

#[inline(always)]
pub fn log_event_with_meta<T, M>(_: T, _: M) {}

#[inline(always)]
pub fn log_timed(_: &str, _: Duration) {}
