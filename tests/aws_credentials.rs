//! Credential resolution through the shared AWS config and credentials files
//!
//! One test only: it points the process environment at temporary files.

use cf_md_to_html::aws::auth::AwsCredentials;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_profiles_from_shared_files() {
    let credentials_file = write_file(
        "[base]\n\
         aws_access_key_id = AKIDBASE\n\
         aws_secret_access_key = base-secret\n\
         \n\
         [static]\n\
         aws_access_key_id = AKIDSTATIC\n\
         aws_secret_access_key = static-secret\n",
    );
    let config_file = write_file(
        "[profile deploy]\n\
         role_arn = arn:aws:iam::123456789012:role/deploy\n\
         source_profile = base\n\
         region = eu-west-1\n",
    );

    for key in ["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY", "AWS_SESSION_TOKEN"] {
        std::env::remove_var(key);
    }
    std::env::set_var("AWS_EC2_METADATA_DISABLED", "true");
    std::env::set_var("AWS_SHARED_CREDENTIALS_FILE", credentials_file.path());
    std::env::set_var("AWS_CONFIG_FILE", config_file.path());

    // An assume-role profile loads; the role is assumed on first use
    std::env::set_var("AWS_PROFILE", "deploy");
    assert!(AwsCredentials::load("eu-west-1").await.is_ok());

    std::env::set_var("AWS_PROFILE", "static");
    let credentials = AwsCredentials::load("eu-west-1").await.unwrap();
    let resolved = credentials.get().await.unwrap();
    assert_eq!(resolved.access_key_id(), "AKIDSTATIC");
    assert_eq!(resolved.secret_access_key(), "static-secret");
}
