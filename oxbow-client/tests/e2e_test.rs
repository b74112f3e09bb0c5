/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Drives one operation through the full default middleware stack against a
//! scripted connection and checks the exact bytes that would go on the wire.

use bytes::Bytes;
use oxbow_auth::Credentials;
use oxbow_client::Client;
use oxbow_endpoint::partition::{Metadata as EndpointMetadata, Protocol, SignatureVersion};
use oxbow_endpoint::CredentialScope;
use oxbow_http::user_agent::UserAgent;
use oxbow_sig_auth::signer::OperationSigningConfig;
use oxbow_types::region::Region;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};
use weft_client::test_connection::TestConnection;
use weft_http::body::SdkBody;
use weft_http::operation;
use weft_http::operation::Operation;
use weft_http::response::ParseHttpResponse;
use weft_types::Error;

#[derive(Clone)]
struct TestOperationParser;

impl<B> ParseHttpResponse<B> for TestOperationParser {
    type Output = Result<String, Error>;

    fn parse_unloaded(&self, _response: &mut http::Response<B>) -> Option<Self::Output> {
        None
    }

    fn parse_loaded(&self, response: &http::Response<Bytes>) -> Self::Output {
        Ok(String::from_utf8_lossy(response.body()).to_string())
    }
}

fn test_operation() -> Operation<TestOperationParser, ()> {
    let mut req = operation::Request::new(
        http::Request::builder()
            .uri("/?Param2=value2&Param1=value1")
            .body(SdkBody::from(""))
            .unwrap(),
    );
    {
        let mut props = req.properties_mut();
        props.insert(Region::new("us-east-1"));
        props.insert(UserAgent::for_tests());
        props.insert(OperationSigningConfig::default_config());
        props.insert(UNIX_EPOCH + Duration::from_secs(1440938160));
        oxbow_endpoint::set_endpoint_resolver(
            &mut props,
            Arc::new(EndpointMetadata {
                uri_template: "example.amazonaws.com",
                protocol: Protocol::Https,
                credential_scope: CredentialScope::builder()
                    .service(oxbow_types::SigningService::from_static("service"))
                    .build(),
                signature_versions: SignatureVersion::V4,
            }),
        );
        oxbow_auth::set_provider(
            &mut props,
            Arc::new(Credentials::from_keys(
                "AKIDEXAMPLE",
                "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
                None,
            )),
        );
    }
    Operation::new(req, TestOperationParser)
        .with_metadata(operation::Metadata::new("test-operation", "test-service"))
}

#[tokio::test]
async fn operation_flows_through_the_full_stack() {
    let conn = TestConnection::new(vec![(
        http::Request::builder()
            .header(
                "user-agent",
                "oxbow-sdk-rust/0.123.test os/windows/XPSP3 lang/rust/1.50.0",
            )
            .header(
                "x-oxbow-user-agent",
                "oxbow-sdk-rust/0.123.test api/test-service/0.123 os/windows/XPSP3 lang/rust/1.50.0",
            )
            .header("x-amz-date", "20150830T123600Z")
            .header(
                "authorization",
                "AWS4-HMAC-SHA256 \
                 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
                 SignedHeaders=host;x-amz-date, \
                 Signature=b97d918cfa904a5beff61c982a1b6f458b799221646efd99d3219ec94cdf2500",
            )
            .uri(http::Uri::from_static(
                "https://example.amazonaws.com/?Param2=value2&Param1=value1",
            ))
            .body(SdkBody::from(""))
            .unwrap(),
        http::Response::builder()
            .status(200)
            .body(SdkBody::from("Hello!"))
            .unwrap(),
    )]);
    let client = Client::new(conn.clone());
    let response = client
        .call(test_operation())
        .await
        .expect("operation should succeed");
    assert_eq!(response, "Hello!");
    conn.assert_requests_match(vec![]);
}

#[tokio::test]
async fn unsigned_headers_do_not_break_the_signature() {
    // An extended user agent varying by platform must not change the
    // signature, since both UA headers stay out of the signed header set.
    let (conn, request) = weft_client::test_connection::capture_request(None);
    let client = Client::new(conn);
    let mut op = test_operation();
    op.properties_mut().insert(UserAgent::new_from_environment(
        oxbow_types::os_shim_internal::Env::from_slice(&[("OXBOW_EXECUTION_ENV", "e2e")]),
        oxbow_http::user_agent::ApiMetadata::new("test-service", "0.123"),
    ));
    client.call(op).await.expect("operation should succeed");
    let request = request.expect_request();
    let auth = request
        .headers()
        .get("authorization")
        .expect("request must be signed")
        .to_str()
        .unwrap();
    assert!(
        auth.ends_with("Signature=b97d918cfa904a5beff61c982a1b6f458b799221646efd99d3219ec94cdf2500"),
        "{}",
        auth
    );
}
