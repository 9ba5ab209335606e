use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Trek API",
        version = "0.1.0",
        description = "Trek discovery: accounts, preference quiz, sketch and personalized search"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/auth", api = domain_users::AuthApiDoc),
        (path = "/users", api = domain_users::ApiDoc),
        (path = "/treks", api = domain_treks::ApiDoc),
        (path = "/discovery", api = domain_discovery::ApiDoc)
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_nests_domain_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/auth/signup",
            "/users/me/feedback",
            "/treks/{id}/comments",
            "/discovery/find",
            "/discovery/location/address",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {} in {:?}",
                expected,
                paths
            );
        }
    }
}
