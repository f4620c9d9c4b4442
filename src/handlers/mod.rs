//! HTTP handlers for the generic resource routes and the meta endpoints.

pub mod entity;
pub mod meta;
