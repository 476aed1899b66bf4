//! Search URL construction

use anyhow::Context;
use reqwest::Url;

/// Resolve a resource type against the FHIR base, which may lack a trailing `/`
fn resource_url(base_url: &str, resource_type: &str) -> anyhow::Result<Url> {
    let base = if base_url.ends_with('/') {
        Url::parse(base_url)
    } else {
        Url::parse(&format!("{base_url}/"))
    }
    .with_context(|| format!("Invalid base URL: {base_url}"))?;
    base.join(resource_type)
        .with_context(|| format!("Cannot build {resource_type} URL from {base_url}"))
}

/// `{base}/Organization?name=<name>`
pub fn organization_search_url(base_url: &str, name: &str) -> anyhow::Result<String> {
    let mut url = resource_url(base_url, "Organization")?;
    url.set_query(Some(&format!("name={}", urlencoding::encode(name))));
    Ok(url.into())
}

/// `{base}/PractitionerRole?organization=Organization/<id>`
///
/// Accepts a bare id or one already prefixed with `Organization/`.
pub fn practitioner_role_search_url(base_url: &str, organization: &str) -> anyhow::Result<String> {
    let id = organization
        .strip_prefix("Organization/")
        .unwrap_or(organization);
    anyhow::ensure!(!id.is_empty(), "Empty organization id");

    let mut url = resource_url(base_url, "PractitionerRole")?;
    url.set_query(Some(&format!(
        "organization=Organization/{}",
        urlencoding::encode(id)
    )));
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://cmsmanapi.anthem.com/fhir/cms_mandate/mcd/";

    #[test]
    fn organization_name_percent_encoded() {
        assert_eq!(
            organization_search_url(BASE, "Cottage Hospital").unwrap(),
            "https://cmsmanapi.anthem.com/fhir/cms_mandate/mcd/Organization?name=Cottage%20Hospital"
        );
    }

    #[test]
    fn base_without_trailing_slash() {
        assert_eq!(
            organization_search_url("https://directory.test/fhir", "A&B").unwrap(),
            "https://directory.test/fhir/Organization?name=A%26B"
        );
    }

    #[test]
    fn practitioner_role_bare_id() {
        assert_eq!(
            practitioner_role_search_url(BASE, "484295").unwrap(),
            "https://cmsmanapi.anthem.com/fhir/cms_mandate/mcd/PractitionerRole?organization=Organization/484295"
        );
    }

    #[test]
    fn practitioner_role_prefixed_id() {
        assert_eq!(
            practitioner_role_search_url(BASE, "Organization/484295").unwrap(),
            practitioner_role_search_url(BASE, "484295").unwrap()
        );
    }

    #[test]
    fn empty_organization_rejected() {
        assert!(practitioner_role_search_url(BASE, "Organization/").is_err());
    }

    #[test]
    fn invalid_base_rejected() {
        let err = organization_search_url("not a url", "x").unwrap_err();
        assert!(err.to_string().contains("Invalid base URL"));
    }
}
