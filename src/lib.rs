// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
//! Helpers for classroom work with ordinary differential equations:
//! bidirectional solution of initial value problems from an inner point t0,
//! direction fields and slope fields drawn as quiver plots, csv and png output.
pub mod Utils;
pub mod numerical;
