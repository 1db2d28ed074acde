#![allow(dead_code)]

pub mod auth;
