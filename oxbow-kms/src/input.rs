/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Operation inputs and their builders.

use crate::config::Config;
use crate::operation;
use oxbow_http::user_agent::UserAgent;
use oxbow_http::OxbowErrorRetryPolicy;
use oxbow_types::os_shim_internal::Env;
use oxbow_types::SigningService;
use serde::Serialize;
use std::collections::HashMap;
use weft_http::body::SdkBody;
use weft_http::operation::{BuildError, Metadata, Operation, Request};
use weft_types::Blob;

const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "TrentService";

fn make_operation<I, H>(
    input: &I,
    handler: H,
    operation_name: &'static str,
    config: &Config,
) -> Result<Operation<H, OxbowErrorRetryPolicy>, BuildError>
where
    I: Serialize,
{
    let region = config.region.clone().ok_or(BuildError::MissingField {
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
        props.insert(SigningService::from_static("kms"));
        props.insert(oxbow_sig_auth::signer::OperationSigningConfig::default_config());
        props.insert(UserAgent::new_from_environment(
            Env::real(),
            crate::API_METADATA.clone(),
        ));
        oxbow_endpoint::set_endpoint_resolver(&mut props, config.endpoint_resolver.clone());
        oxbow_auth::set_provider(&mut props, config.credentials_provider.clone());
    }
    Ok(Operation::new(request, handler)
        .with_metadata(Metadata::new(operation_name, "kms"))
        .with_retry_policy(OxbowErrorRetryPolicy::new()))
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GenerateRandomInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_bytes: Option<i32>,
}

impl GenerateRandomInput {
    pub fn builder() -> generate_random_input::Builder {
        generate_random_input::Builder::default()
    }

    pub fn make_operation(
        &self,
        config: &Config,
    ) -> Result<Operation<operation::GenerateRandom, OxbowErrorRetryPolicy>, BuildError> {
        make_operation(
            self,
            operation::GenerateRandom::new(),
            "GenerateRandom",
            config,
        )
    }
}

pub mod generate_random_input {
    use super::GenerateRandomInput;
    use weft_http::operation::BuildError;

    #[derive(Clone, Debug, Default)]
    pub struct Builder {
        number_of_bytes: Option<i32>,
    }

    impl Builder {
        pub fn number_of_bytes(mut self, number_of_bytes: i32) -> Self {
            self.number_of_bytes = Some(number_of_bytes);
            self
        }

        pub fn set_number_of_bytes(mut self, number_of_bytes: Option<i32>) -> Self {
            self.number_of_bytes = number_of_bytes;
            self
        }

        pub fn build(self) -> Result<GenerateRandomInput, BuildError> {
            Ok(GenerateRandomInput {
                number_of_bytes: self.number_of_bytes,
            })
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EncryptInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plaintext: Option<Blob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_context: Option<HashMap<String, String>>,
}

impl EncryptInput {
    pub fn builder() -> encrypt_input::Builder {
        encrypt_input::Builder::default()
    }

    pub fn make_operation(
        &self,
        config: &Config,
    ) -> Result<Operation<operation::Encrypt, OxbowErrorRetryPolicy>, BuildError> {
        make_operation(self, operation::Encrypt::new(), "Encrypt", config)
    }
}

pub mod encrypt_input {
    use super::EncryptInput;
    use std::collections::HashMap;
    use weft_http::operation::BuildError;
    use weft_types::Blob;

    #[derive(Clone, Debug, Default)]
    pub struct Builder {
        key_id: Option<String>,
        plaintext: Option<Blob>,
        encryption_context: Option<HashMap<String, String>>,
    }

    impl Builder {
        pub fn key_id(mut self, key_id: impl Into<String>) -> Self {
            self.key_id = Some(key_id.into());
            self
        }

        pub fn plaintext(mut self, plaintext: Blob) -> Self {
            self.plaintext = Some(plaintext);
            self
        }

        /// Add a single encryption context pair. Can be called multiple
        /// times.
        pub fn encryption_context(
            mut self,
            key: impl Into<String>,
            value: impl Into<String>,
        ) -> Self {
            self.encryption_context
                .get_or_insert_with(HashMap::new)
                .insert(key.into(), value.into());
            self
        }

        pub fn build(self) -> Result<EncryptInput, BuildError> {
            if self.key_id.is_none() {
                return Err(BuildError::MissingField {
                    field: "key_id",
                    details: "encryption needs a key to encrypt under",
                });
            }
            if self.plaintext.is_none() {
                return Err(BuildError::MissingField {
                    field: "plaintext",
                    details: "there is nothing to encrypt without a plaintext",
                });
            }
            Ok(EncryptInput {
                key_id: self.key_id,
                plaintext: self.plaintext,
                encryption_context: self.encryption_context,
            })
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DecryptInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ciphertext_blob: Option<Blob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_context: Option<HashMap<String, String>>,
}

impl DecryptInput {
    pub fn builder() -> decrypt_input::Builder {
        decrypt_input::Builder::default()
    }

    pub fn make_operation(
        &self,
        config: &Config,
    ) -> Result<Operation<operation::Decrypt, OxbowErrorRetryPolicy>, BuildError> {
        make_operation(self, operation::Decrypt::new(), "Decrypt", config)
    }
}

pub mod decrypt_input {
    use super::DecryptInput;
    use std::collections::HashMap;
    use weft_http::operation::BuildError;
    use weft_types::Blob;

    #[derive(Clone, Debug, Default)]
    pub struct Builder {
        ciphertext_blob: Option<Blob>,
        key_id: Option<String>,
        encryption_context: Option<HashMap<String, String>>,
    }

    impl Builder {
        pub fn ciphertext_blob(mut self, ciphertext_blob: Blob) -> Self {
            self.ciphertext_blob = Some(ciphertext_blob);
            self
        }

        pub fn key_id(mut self, key_id: impl Into<String>) -> Self {
            self.key_id = Some(key_id.into());
            self
        }

        /// Add a single encryption context pair. Can be called multiple
        /// times.
        pub fn encryption_context(
            mut self,
            key: impl Into<String>,
            value: impl Into<String>,
        ) -> Self {
            self.encryption_context
                .get_or_insert_with(HashMap::new)
                .insert(key.into(), value.into());
            self
        }

        pub fn build(self) -> Result<DecryptInput, BuildError> {
            if self.ciphertext_blob.is_none() {
                return Err(BuildError::MissingField {
                    field: "ciphertext_blob",
                    details: "there is nothing to decrypt without a ciphertext",
                });
            }
            Ok(DecryptInput {
                ciphertext_blob: self.ciphertext_blob,
                key_id: self.key_id,
                encryption_context: self.encryption_context,
            })
        }
    }
}
