/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Response handlers, one per operation.
//!
//! Bodies are fully buffered before parsing, so every handler implements
//! [`ParseStrictResponse`].

use bytes::Bytes;
use weft_http::response::ParseStrictResponse;

macro_rules! operation {
    ($(#[$docs:meta])* $name:ident, $builder:ident, $output:ident, $error:ident) => {
        $(#[$docs])*
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $name {
            _private: (),
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn builder() -> crate::input::$builder::Builder {
                crate::input::$builder::Builder::default()
            }
        }

        impl ParseStrictResponse for $name {
            type Output = Result<crate::output::$output, crate::error::$error>;

            fn parse(&self, response: &http::Response<Bytes>) -> Self::Output {
                if !response.status().is_success() {
                    return Err(crate::error::$error::from_response(response));
                }
                serde_json::from_slice(response.body()).map_err(|err| {
                    crate::error::$error::unhandled(format!(
                        "failed to parse the response body: {}",
                        err
                    ))
                })
            }
        }
    };
}

operation! {
    /// List the tables in the account, paginated.
    ListTables, list_tables_input, ListTablesOutput, ListTablesError
}
operation! {
    /// Describe a single table: schema, status, and throughput.
    DescribeTable, describe_table_input, DescribeTableOutput, DescribeTableError
}
operation! {
    /// Read a single item by primary key.
    GetItem, get_item_input, GetItemOutput, GetItemError
}
operation! {
    /// Create or replace a single item.
    PutItem, put_item_input, PutItemOutput, PutItemError
}
operation! {
    /// Delete a single item by primary key.
    DeleteItem, delete_item_input, DeleteItemOutput, DeleteItemError
}

#[cfg(test)]
mod test {
    use super::{DescribeTable, GetItem};
    use crate::error::GetItemError;
    use crate::model::AttributeValue;
    use bytes::Bytes;
    use weft_http::response::ParseStrictResponse;

    #[test]
    fn success_bodies_parse_into_outputs() {
        let response = http::Response::builder()
            .status(200)
            .body(Bytes::from_static(
                br#"{"Item":{"title":{"S":"Turn It Down, Or Else!"}}}"#,
            ))
            .unwrap();
        let output = GetItem::new().parse(&response).expect("valid body");
        let item = output.item.expect("item is present");
        assert_eq!(
            item.get("title"),
            Some(&AttributeValue::S("Turn It Down, Or Else!".to_string()))
        );
    }

    #[test]
    fn error_status_takes_the_error_path() {
        let response = http::Response::builder()
            .status(400)
            .body(Bytes::from_static(
                br#"{"__type":"com.amazonaws.dynamodb.v20120810#ResourceNotFoundException"}"#,
            ))
            .unwrap();
        let err = GetItem::new().parse(&response).expect_err("status was 400");
        assert!(matches!(err, GetItemError::ResourceNotFoundException(_)));
    }

    #[test]
    fn truncated_success_bodies_are_unhandled_errors() {
        let response = http::Response::builder()
            .status(200)
            .body(Bytes::from_static(br#"{"Table":{"TableName""#))
            .unwrap();
        DescribeTable::new()
            .parse(&response)
            .expect_err("body was truncated");
    }
}
