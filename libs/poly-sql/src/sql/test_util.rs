// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Test assertion to check SQL statements and parameters. Exported so that crates building
//! fragments on top of this one can assert on them the same way.

/// Assert that a `(statement, params)` pair matches the expected statement and parameters.
///
/// # Example:
/// ```no_run
/// assert_binding!(predicate.to_sql(), r#""notes_1"."id" = $1"#, 5);
/// ```
#[macro_export]
macro_rules! assert_binding {
    ($actual:expr, $expected_stmt:expr $(, $expected_param:expr)* $(,)?) => {{
        let (actual_stmt, actual_params) = $actual;
        assert_eq!(actual_stmt, $expected_stmt);

        let expected_params: Vec<std::sync::Arc<dyn $crate::SQLParam>> = vec![
            $(std::sync::Arc::new($expected_param) as std::sync::Arc<dyn $crate::SQLParam>),*
        ];
        assert_eq!(
            actual_params.len(),
            expected_params.len(),
            "Parameter count mismatch"
        );
        for (actual, expected) in actual_params.iter().zip(expected_params.iter()) {
            assert!(
                actual.as_ref() == expected.as_ref(),
                "Parameter mismatch: {actual:?} != {expected:?}"
            );
        }
    }};
}
