// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module

mod acl_composition;
mod plan_order;
mod retention;
mod topology_shape;
