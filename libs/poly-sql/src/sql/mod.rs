// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

#[macro_use]
mod test_util;

pub mod column;
pub mod expression_builder;
pub mod order;
pub mod predicate;
pub mod select;
pub mod sql_builder;
pub mod sql_param;
pub mod table;

pub use expression_builder::ExpressionBuilder;
pub use sql_builder::SQLBuilder;
pub use sql_param::{SQLParam, SQLParamContainer};
