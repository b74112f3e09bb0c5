/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Operation inputs and their builders.
//!
//! Each input serializes straight onto the wire, so the field renames here
//! define the protocol. `make_operation` attaches everything the middleware
//! stack needs (region, signing config, credentials, endpoint resolver) to
//! the request property bag.

use crate::config::Config;
use crate::model::AttributeValue;
use crate::operation;
use oxbow_http::user_agent::UserAgent;
use oxbow_http::OxbowErrorRetryPolicy;
use oxbow_types::os_shim_internal::Env;
use oxbow_types::SigningService;
use serde::Serialize;
use std::collections::HashMap;
use weft_http::body::SdkBody;
use weft_http::operation::{BuildError, Metadata, Operation, Request};

const CONTENT_TYPE: &str = "application/x-amz-json-1.0";
const TARGET_PREFIX: &str = "DynamoDB_20120810";

/// Serialize an input and wrap it into a ready-to-dispatch `Operation`.
fn make_operation<I, H>(
    input: &I,
    handler: H,
    operation_name: &'static str,
    config: &Config,
) -> Result<Operation<H, OxbowErrorRetryPolicy>, BuildError>
where
    I: Serialize,
{
    let region = config
        .region
        .clone()
        .ok_or(BuildError::MissingField {
            field: "region",
            details: "a region is required to resolve an endpoint and sign the request",
        })?;
    let body = serde_json::to_vec(input).map_err(|err| BuildError::SerializationError(err.into()))?;
    let request = http::Request::builder()
        .method(http::Method::POST)
        .uri("/")
        .header(http::header::CONTENT_TYPE, CONTENT_TYPE)
        .header(
            "x-amz-target",
            format!("{}.{}", TARGET_PREFIX, operation_name),
        )
        .body(SdkBody::from(body))
        .map_err(|err| BuildError::SerializationError(err.into()))?;
    let mut request = Request::new(request);
    {
        let mut props = request.properties_mut();
        props.insert(region);
        props.insert(SigningService::from_static("dynamodb"));
        props.insert(oxbow_sig_auth::signer::OperationSigningConfig::default_config());
        props.insert(UserAgent::new_from_environment(
            Env::real(),
            crate::API_METADATA.clone(),
        ));
        oxbow_endpoint::set_endpoint_resolver(&mut props, config.endpoint_resolver.clone());
        oxbow_auth::set_provider(&mut props, config.credentials_provider.clone());
    }
    Ok(Operation::new(request, handler)
        .with_metadata(Metadata::new(operation_name, "dynamodb"))
        .with_retry_policy(OxbowErrorRetryPolicy::new()))
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListTablesInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_start_table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
}

impl ListTablesInput {
    pub fn builder() -> list_tables_input::Builder {
        list_tables_input::Builder::default()
    }

    pub fn make_operation(
        &self,
        config: &Config,
    ) -> Result<Operation<operation::ListTables, OxbowErrorRetryPolicy>, BuildError> {
        make_operation(self, operation::ListTables::new(), "ListTables", config)
    }
}

pub mod list_tables_input {
    use super::ListTablesInput;
    use weft_http::operation::BuildError;

    #[derive(Clone, Debug, Default)]
    pub struct Builder {
        exclusive_start_table_name: Option<String>,
        limit: Option<i32>,
    }

    impl Builder {
        pub fn exclusive_start_table_name(mut self, name: impl Into<String>) -> Self {
            self.exclusive_start_table_name = Some(name.into());
            self
        }

        pub fn set_exclusive_start_table_name(mut self, name: Option<String>) -> Self {
            self.exclusive_start_table_name = name;
            self
        }

        pub fn limit(mut self, limit: i32) -> Self {
            self.limit = Some(limit);
            self
        }

        pub fn set_limit(mut self, limit: Option<i32>) -> Self {
            self.limit = limit;
            self
        }

        pub fn build(self) -> Result<ListTablesInput, BuildError> {
            Ok(ListTablesInput {
                exclusive_start_table_name: self.exclusive_start_table_name,
                limit: self.limit,
            })
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeTableInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
}

impl DescribeTableInput {
    pub fn builder() -> describe_table_input::Builder {
        describe_table_input::Builder::default()
    }

    pub fn make_operation(
        &self,
        config: &Config,
    ) -> Result<Operation<operation::DescribeTable, OxbowErrorRetryPolicy>, BuildError> {
        make_operation(
            self,
            operation::DescribeTable::new(),
            "DescribeTable",
            config,
        )
    }
}

pub mod describe_table_input {
    use super::DescribeTableInput;
    use weft_http::operation::BuildError;

    #[derive(Clone, Debug, Default)]
    pub struct Builder {
        table_name: Option<String>,
    }

    impl Builder {
        pub fn table_name(mut self, name: impl Into<String>) -> Self {
            self.table_name = Some(name.into());
            self
        }

        pub fn set_table_name(mut self, name: Option<String>) -> Self {
            self.table_name = name;
            self
        }

        pub fn build(self) -> Result<DescribeTableInput, BuildError> {
            if self.table_name.is_none() {
                return Err(BuildError::MissingField {
                    field: "table_name",
                    details: "every table operation names its table",
                });
            }
            Ok(DescribeTableInput {
                table_name: self.table_name,
            })
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<HashMap<String, AttributeValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,
}

impl GetItemInput {
    pub fn builder() -> get_item_input::Builder {
        get_item_input::Builder::default()
    }

    pub fn make_operation(
        &self,
        config: &Config,
    ) -> Result<Operation<operation::GetItem, OxbowErrorRetryPolicy>, BuildError> {
        make_operation(self, operation::GetItem::new(), "GetItem", config)
    }
}

pub mod get_item_input {
    use super::GetItemInput;
    use crate::model::AttributeValue;
    use std::collections::HashMap;
    use weft_http::operation::BuildError;

    #[derive(Clone, Debug, Default)]
    pub struct Builder {
        table_name: Option<String>,
        key: Option<HashMap<String, AttributeValue>>,
        consistent_read: Option<bool>,
        projection_expression: Option<String>,
    }

    impl Builder {
        pub fn table_name(mut self, name: impl Into<String>) -> Self {
            self.table_name = Some(name.into());
            self
        }

        /// Add a single key attribute. Can be called multiple times.
        pub fn key(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
            self.key
                .get_or_insert_with(HashMap::new)
                .insert(name.into(), value);
            self
        }

        pub fn set_key(mut self, key: Option<HashMap<String, AttributeValue>>) -> Self {
            self.key = key;
            self
        }

        pub fn consistent_read(mut self, consistent_read: bool) -> Self {
            self.consistent_read = Some(consistent_read);
            self
        }

        pub fn projection_expression(mut self, expression: impl Into<String>) -> Self {
            self.projection_expression = Some(expression.into());
            self
        }

        pub fn build(self) -> Result<GetItemInput, BuildError> {
            if self.table_name.is_none() {
                return Err(BuildError::MissingField {
                    field: "table_name",
                    details: "every table operation names its table",
                });
            }
            if self.key.is_none() {
                return Err(BuildError::MissingField {
                    field: "key",
                    details: "the primary key selects the item to read",
                });
            }
            Ok(GetItemInput {
                table_name: self.table_name,
                key: self.key,
                consistent_read: self.consistent_read,
                projection_expression: self.projection_expression,
            })
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutItemInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<HashMap<String, AttributeValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_attribute_names: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_attribute_values: Option<HashMap<String, AttributeValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_values: Option<String>,
}

impl PutItemInput {
    pub fn builder() -> put_item_input::Builder {
        put_item_input::Builder::default()
    }

    pub fn make_operation(
        &self,
        config: &Config,
    ) -> Result<Operation<operation::PutItem, OxbowErrorRetryPolicy>, BuildError> {
        make_operation(self, operation::PutItem::new(), "PutItem", config)
    }
}

pub mod put_item_input {
    use super::PutItemInput;
    use crate::model::AttributeValue;
    use std::collections::HashMap;
    use weft_http::operation::BuildError;

    #[derive(Clone, Debug, Default)]
    pub struct Builder {
        table_name: Option<String>,
        item: Option<HashMap<String, AttributeValue>>,
        condition_expression: Option<String>,
        expression_attribute_names: Option<HashMap<String, String>>,
        expression_attribute_values: Option<HashMap<String, AttributeValue>>,
        return_values: Option<String>,
    }

    impl Builder {
        pub fn table_name(mut self, name: impl Into<String>) -> Self {
            self.table_name = Some(name.into());
            self
        }

        /// Add a single item attribute. Can be called multiple times.
        pub fn item(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
            self.item
                .get_or_insert_with(HashMap::new)
                .insert(name.into(), value);
            self
        }

        pub fn set_item(mut self, item: Option<HashMap<String, AttributeValue>>) -> Self {
            self.item = item;
            self
        }

        pub fn condition_expression(mut self, expression: impl Into<String>) -> Self {
            self.condition_expression = Some(expression.into());
            self
        }

        pub fn set_expression_attribute_names(
            mut self,
            names: Option<HashMap<String, String>>,
        ) -> Self {
            self.expression_attribute_names = names;
            self
        }

        pub fn set_expression_attribute_values(
            mut self,
            values: Option<HashMap<String, AttributeValue>>,
        ) -> Self {
            self.expression_attribute_values = values;
            self
        }

        pub fn return_values(mut self, return_values: impl Into<String>) -> Self {
            self.return_values = Some(return_values.into());
            self
        }

        pub fn build(self) -> Result<PutItemInput, BuildError> {
            if self.table_name.is_none() {
                return Err(BuildError::MissingField {
                    field: "table_name",
                    details: "every table operation names its table",
                });
            }
            if self.item.is_none() {
                return Err(BuildError::MissingField {
                    field: "item",
                    details: "there is nothing to put without an item",
                });
            }
            Ok(PutItemInput {
                table_name: self.table_name,
                item: self.item,
                condition_expression: self.condition_expression,
                expression_attribute_names: self.expression_attribute_names,
                expression_attribute_values: self.expression_attribute_values,
                return_values: self.return_values,
            })
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteItemInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<HashMap<String, AttributeValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_attribute_values: Option<HashMap<String, AttributeValue>>,
}

impl DeleteItemInput {
    pub fn builder() -> delete_item_input::Builder {
        delete_item_input::Builder::default()
    }

    pub fn make_operation(
        &self,
        config: &Config,
    ) -> Result<Operation<operation::DeleteItem, OxbowErrorRetryPolicy>, BuildError> {
        make_operation(self, operation::DeleteItem::new(), "DeleteItem", config)
    }
}

pub mod delete_item_input {
    use super::DeleteItemInput;
    use crate::model::AttributeValue;
    use std::collections::HashMap;
    use weft_http::operation::BuildError;

    #[derive(Clone, Debug, Default)]
    pub struct Builder {
        table_name: Option<String>,
        key: Option<HashMap<String, AttributeValue>>,
        condition_expression: Option<String>,
        expression_attribute_values: Option<HashMap<String, AttributeValue>>,
    }

    impl Builder {
        pub fn table_name(mut self, name: impl Into<String>) -> Self {
            self.table_name = Some(name.into());
            self
        }

        /// Add a single key attribute. Can be called multiple times.
        pub fn key(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
            self.key
                .get_or_insert_with(HashMap::new)
                .insert(name.into(), value);
            self
        }

        pub fn set_key(mut self, key: Option<HashMap<String, AttributeValue>>) -> Self {
            self.key = key;
            self
        }

        pub fn condition_expression(mut self, expression: impl Into<String>) -> Self {
            self.condition_expression = Some(expression.into());
            self
        }

        pub fn set_expression_attribute_values(
            mut self,
            values: Option<HashMap<String, AttributeValue>>,
        ) -> Self {
            self.expression_attribute_values = values;
            self
        }

        pub fn build(self) -> Result<DeleteItemInput, BuildError> {
            if self.table_name.is_none() {
                return Err(BuildError::MissingField {
                    field: "table_name",
                    details: "every table operation names its table",
                });
            }
            if self.key.is_none() {
                return Err(BuildError::MissingField {
                    field: "key",
                    details: "the primary key selects the item to delete",
                });
            }
            Ok(DeleteItemInput {
                table_name: self.table_name,
                key: self.key,
                condition_expression: self.condition_expression,
                expression_attribute_values: self.expression_attribute_values,
            })
        }
    }
}

#[cfg(test)]
mod test {
    use super::{DescribeTableInput, GetItemInput, ListTablesInput};
    use crate::model::AttributeValue;
    use crate::Config;
    use oxbow_types::region::Region;
    use oxbow_types::SigningService;
    use weft_http::operation::BuildError;

    #[test]
    fn required_members_are_validated() {
        let err = DescribeTableInput::builder()
            .build()
            .expect_err("table_name is required");
        assert!(matches!(
            err,
            BuildError::MissingField {
                field: "table_name",
                ..
            }
        ));
        let err = GetItemInput::builder()
            .table_name("Movies")
            .build()
            .expect_err("key is required");
        assert!(matches!(err, BuildError::MissingField { field: "key", .. }));
    }

    #[test]
    fn inputs_serialize_with_wire_names() {
        let input = GetItemInput::builder()
            .table_name("Movies")
            .key("year", AttributeValue::N("2013".to_string()))
            .consistent_read(true)
            .build()
            .unwrap();
        assert_eq!(
            serde_json::to_string(&input).unwrap(),
            r#"{"TableName":"Movies","Key":{"year":{"N":"2013"}},"ConsistentRead":true}"#
        );
    }

    #[test]
    fn empty_input_serializes_to_an_empty_object() {
        let input = ListTablesInput::builder().build().unwrap();
        assert_eq!(serde_json::to_string(&input).unwrap(), "{}");
    }

    #[test]
    fn make_operation_requires_a_region() {
        let conf = Config::builder().build();
        let err = ListTablesInput::builder()
            .build()
            .unwrap()
            .make_operation(&conf)
            .expect_err("no region configured");
        assert!(matches!(
            err,
            BuildError::MissingField { field: "region", .. }
        ));
    }

    #[test]
    fn make_operation_attaches_wire_and_signing_properties() {
        let conf = Config::builder()
            .region(Region::new("us-east-1"))
            .credentials_provider(crate::Credentials::from_keys("AKNOTREAL", "NOT_A_SECRET", None))
            .build();
        let op = ListTablesInput::builder()
            .limit(10)
            .build()
            .unwrap()
            .make_operation(&conf)
            .expect("valid operation");
        let (request, parts) = op.into_request_response();
        assert_eq!(parts.metadata.unwrap().name(), "ListTables");
        let (http_req, props) = request.into_parts();
        assert_eq!(
            http_req.headers().get("x-amz-target").unwrap(),
            "DynamoDB_20120810.ListTables"
        );
        assert_eq!(
            http_req.headers().get("content-type").unwrap(),
            "application/x-amz-json-1.0"
        );
        assert_eq!(http_req.body().bytes().unwrap(), &br#"{"Limit":10}"#[..]);
        let props = props.lock().unwrap();
        assert_eq!(
            props.get::<SigningService>().map(|s| s.as_ref()),
            Some("dynamodb")
        );
        assert!(props.get::<Region>().is_some());
    }
}
