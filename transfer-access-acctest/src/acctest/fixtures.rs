//! Terraform configurations exercised by the access scenarios.
//!
//! Every fixture is assembled from a shared base (VPC, Simple AD directory,
//! IAM role) plus a server flavor (S3 or EFS) and the `aws_transfer_access`
//! resource itself.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// Prefix for names of resources created by acceptance tests.
pub const RESOURCE_PREFIX: &str = "tf-acc-test";

/// Directory SID granted access in every fixture.
pub const EXTERNAL_ID: &str = "S-1-1-12-1234567890-123456789-1234567890-1234";

/// Address of the resource under test.
pub const RESOURCE_NAME: &str = "aws_transfer_access.test";

/// `<prefix>-<random digits>`, unique enough to avoid collisions between runs.
#[must_use]
pub fn random_with_prefix(prefix: &str) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let n = (Uuid::new_v4().as_u128() as u64) >> 1;
    format!("{prefix}-{n}")
}

/// Concatenate configuration fragments.
#[must_use]
pub fn compose_config<S: AsRef<str>>(configs: &[S]) -> String {
    configs.iter().fold(String::new(), |mut acc, c| {
        acc.push_str(c.as_ref());
        acc
    })
}

/// Availability zones that do not need an opt-in.
#[must_use]
pub fn available_azs_no_opt_in() -> &'static str {
    r#"
data "aws_availability_zones" "available" {
  state = "available"

  filter {
    name   = "opt-in-status"
    values = ["opt-in-not-required"]
  }
}
"#
}

/// VPC, two subnets, a Simple AD directory and the Transfer IAM role.
#[must_use]
pub fn config_base(name: &str) -> String {
    compose_config(&[
        available_azs_no_opt_in().to_string(),
        format!(
            r#"
data "aws_partition" "current" {{}}

resource "aws_vpc" "test" {{
  cidr_block = "10.0.0.0/16"

  tags = {{
    Name = {name:?}
  }}
}}

resource "aws_internet_gateway" "test" {{
  vpc_id = aws_vpc.test.id

  tags = {{
    Name = {name:?}
  }}
}}

resource "aws_subnet" "test" {{
  vpc_id                  = aws_vpc.test.id
  cidr_block              = "10.0.0.0/24"
  map_public_ip_on_launch = true
  availability_zone       = data.aws_availability_zones.available.names[0]

  tags = {{
    Name = {name:?}
  }}

  depends_on = [aws_internet_gateway.test]
}}

resource "aws_subnet" "test2" {{
  vpc_id                  = aws_vpc.test.id
  cidr_block              = "10.0.1.0/24"
  map_public_ip_on_launch = true
  availability_zone       = data.aws_availability_zones.available.names[1]

  tags = {{
    Name = {name:?}
  }}

  depends_on = [aws_internet_gateway.test]
}}

resource "aws_directory_service_directory" "test" {{
  name     = "corp.notexample.com"
  password = "SuperSecretPassw0rd"

  vpc_settings {{
    vpc_id = aws_vpc.test.id

    subnet_ids = [
      aws_subnet.test.id,
      aws_subnet.test2.id
    ]
  }}
}}

resource "aws_iam_role" "test" {{
  name = {name:?}

  assume_role_policy = <<EOF
{{
  "Version": "2012-10-17",
  "Statement": [{{
    "Effect": "Allow",
    "Principal": {{
      "Service": "transfer.amazonaws.com"
    }},
    "Action": "sts:AssumeRole"
  }}]
}}
EOF
}}
"#
        ),
    ])
}

/// Directory-backed S3 server, a bucket, and a role policy allowing S3.
#[must_use]
pub fn config_base_s3(name: &str) -> String {
    format!(
        r#"
resource "aws_transfer_server" "test" {{
  identity_provider_type = "AWS_DIRECTORY_SERVICE"
  directory_id           = aws_directory_service_directory.test.id
  logging_role           = aws_iam_role.test.arn
}}

resource "aws_s3_bucket" "test" {{
  bucket = {name:?}
  acl    = "private"
}}

resource "aws_iam_role_policy" "test" {{
  name = {name:?}
  role = aws_iam_role.test.id

  policy = <<POLICY
{{
   "Version":"2012-10-17",
   "Statement":[
      {{
         "Sid":"AllowFullAccesstoCloudWatchLogs",
         "Effect":"Allow",
         "Action":[
            "logs:*"
         ],
         "Resource":"*"
      }},
      {{
         "Sid":"AllowFullAccesstoS3",
         "Effect":"Allow",
         "Action":[
            "s3:*"
         ],
         "Resource":"*"
      }}
   ]
}}
POLICY
}}
"#
    )
}

/// Directory-backed EFS server, a file system, and a logging role policy.
#[must_use]
pub fn config_base_efs(name: &str) -> String {
    format!(
        r#"
resource "aws_transfer_server" "test" {{
  identity_provider_type = "AWS_DIRECTORY_SERVICE"
  directory_id           = aws_directory_service_directory.test.id
  logging_role           = aws_iam_role.test.arn
  domain                 = "EFS"
}}

resource "aws_efs_file_system" "test" {{}}

resource "aws_iam_role_policy" "test" {{
  name = {name:?}
  role = aws_iam_role.test.id

  policy = <<POLICY
{{
  "Version": "2012-10-17",
  "Statement": [{{
    "Sid": "AllowFullAccesstoCloudWatchLogs",
    "Effect": "Allow",
    "Action": [
      "logs:*"
    ],
    "Resource": "*"
  }}]
}}
POLICY
}}
"#
    )
}

fn access_resource(home_directory: &str, extra: &str) -> String {
    format!(
        r#"
resource "aws_transfer_access" "test" {{
  external_id = "{EXTERNAL_ID}"
  server_id   = aws_transfer_server.test.id
  role        = aws_iam_role.test.arn

  home_directory      = "{home_directory}"
  home_directory_type = "PATH"
{extra}}}
"#
    )
}

const POSIX_PROFILE: &str = r"
  posix_profile {
    gid = 1000
    uid = 1000
  }
";

const SCOPE_DOWN_POLICY: &str = r#"
  policy = <<EOF
{
    "Version": "2012-10-17",
    "Statement": [
        {
            "Sid": "AllowListingOfUserFolder",
            "Action": [
                "s3:ListBucket"
            ],
            "Effect": "Allow",
            "Resource": [
                "arn:${data.aws_partition.current.partition}:s3:::$${transfer:HomeBucket}"
            ]
        },
        {
            "Sid": "HomeDirObjectAccess",
            "Effect": "Allow",
            "Action": [
                "s3:PutObject",
                "s3:GetObject",
                "s3:DeleteObject",
                "s3:DeleteObjectVersion",
                "s3:GetObjectVersion",
                "s3:GetObjectACL",
                "s3:PutObjectACL"
            ],
            "Resource": "arn:${data.aws_partition.current.partition}:s3:::$${transfer:HomeDirectory}/*"
        }
    ]
}
EOF
"#;

/// The configurations a scenario can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixture {
    S3Basic,
    S3Updated,
    S3ScopeDownPolicy,
    EfsBasic,
    EfsUpdated,
}

impl Fixture {
    pub const ALL: [Self; 5] = [
        Self::S3Basic,
        Self::S3Updated,
        Self::S3ScopeDownPolicy,
        Self::EfsBasic,
        Self::EfsUpdated,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::S3Basic => "s3-basic",
            Self::S3Updated => "s3-updated",
            Self::S3ScopeDownPolicy => "s3-scope-down-policy",
            Self::EfsBasic => "efs-basic",
            Self::EfsUpdated => "efs-updated",
        }
    }

    /// Full configuration for resources named `name`.
    #[must_use]
    pub fn render(self, name: &str) -> String {
        let (server_base, access) = match self {
            Self::S3Basic => (
                config_base_s3(name),
                access_resource("/${aws_s3_bucket.test.id}/", ""),
            ),
            Self::S3Updated => (
                config_base_s3(name),
                access_resource("/${aws_s3_bucket.test.id}/test", ""),
            ),
            Self::S3ScopeDownPolicy => (
                config_base_s3(name),
                access_resource("/${aws_s3_bucket.test.id}/", SCOPE_DOWN_POLICY),
            ),
            Self::EfsBasic => (
                config_base_efs(name),
                access_resource("/${aws_efs_file_system.test.id}/", POSIX_PROFILE),
            ),
            Self::EfsUpdated => (
                config_base_efs(name),
                access_resource("/${aws_efs_file_system.test.id}/test", POSIX_PROFILE),
            ),
        };

        compose_config(&[config_base(name), server_base, access])
    }
}

impl fmt::Display for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Fixture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|f| f.as_str()).collect();
                format!("unknown fixture '{s}', expected one of: {}", known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_with_prefix() {
        let a = random_with_prefix(RESOURCE_PREFIX);
        let b = random_with_prefix(RESOURCE_PREFIX);
        assert!(a.starts_with("tf-acc-test-"));
        assert!(a["tf-acc-test-".len()..].chars().all(|c| c.is_ascii_digit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_s3_basic_fixture() {
        let config = Fixture::S3Basic.render("tf-acc-test-42");

        assert!(config.contains(r#"data "aws_availability_zones" "available""#));
        assert!(config.contains(r#"name = "tf-acc-test-42""#));
        assert!(config.contains(r#"bucket = "tf-acc-test-42""#));
        assert!(config.contains(&format!(r#"external_id = "{EXTERNAL_ID}""#)));
        assert!(config.contains(r#"home_directory      = "/${aws_s3_bucket.test.id}/""#));
        assert!(!config.contains("posix_profile"));
        assert!(!config.contains("{{"));
    }

    #[test]
    fn test_efs_updated_fixture() {
        let config = Fixture::EfsUpdated.render("tf-acc-test-42");

        assert!(config.contains(r#"domain                 = "EFS""#));
        assert!(config.contains("/${aws_efs_file_system.test.id}/test"));
        assert!(config.contains("posix_profile {"));
        assert!(!config.contains("aws_s3_bucket"));
    }

    #[test]
    fn test_scope_down_policy_keeps_escaped_interpolation() {
        let config = Fixture::S3ScopeDownPolicy.render("tf-acc-test-42");
        assert!(config.contains("$${transfer:HomeBucket}"));
        assert!(config.contains("$${transfer:HomeDirectory}/*"));
    }

    #[test]
    fn test_fixture_names_roundtrip() {
        for fixture in Fixture::ALL {
            assert_eq!(fixture.as_str().parse::<Fixture>().unwrap(), fixture);
        }
        assert!("s3".parse::<Fixture>().unwrap_err().contains("efs-basic"));
    }
}
