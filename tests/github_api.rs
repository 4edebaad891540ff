use api_scout::analyze::Analyzer;
use api_scout::cache::ContentCache;
use api_scout::config::Settings;
use api_scout::github::GitHubClient;
use api_scout::listing::list_download_urls;
use api_scout::{RepoRef, ScoutError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use httpmock::prelude::*;
use serde_json::json;

const USER_CONTROLLER: &str = r#"package app.controller;

import app.dto.UserDTO;
import org.springframework.web.bind.annotation.*;

@RestController
public class UserController {
    @PostMapping("/users")
    public void create(@RequestBody UserDTO user) {
    }
}
"#;

const USER_DTO: &str = r#"package app.dto;

import lombok.Data;

@Data
public class UserDTO {
    private String name;
    private Integer age;
}
"#;

/// Contents API style: base64 broken into 60 column lines.
fn github_base64(text: &str) -> String {
    let encoded = STANDARD.encode(text);
    let mut wrapped = String::new();
    for chunk in encoded.as_bytes().chunks(60) {
        wrapped.push_str(std::str::from_utf8(chunk).unwrap());
        wrapped.push('\n');
    }
    wrapped
}

fn settings_for(server: &MockServer) -> Settings {
    Settings {
        api_base_url: server.base_url(),
        raw_base_url: format!("{}/raw", server.base_url()),
        token: Some("test-token".to_string()),
        timeout_secs: 5,
        ..Settings::default()
    }
}

fn mock_snapshot(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET)
            .path("/repos/acme/shop/branches/main")
            .header("authorization", "Bearer test-token")
            .header("x-github-api-version", "2022-11-28");
        then.status(200).json_body(json!({
            "name": "main",
            "commit": { "sha": "deadbeef" }
        }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/repos/acme/shop/git/trees/deadbeef")
            .query_param("recursive", "1");
        then.status(200).json_body(json!({
            "sha": "deadbeef",
            "truncated": false,
            "tree": [
                { "path": "app", "type": "tree" },
                { "path": "app/controller", "type": "tree" },
                { "path": "app/controller/UserController.java", "type": "blob" },
                { "path": "app/dto", "type": "tree" },
                { "path": "app/dto/UserDTO.java", "type": "blob" },
                { "path": "pom.xml", "type": "blob" }
            ]
        }));
    });
}

fn mock_file<'a>(server: &'a MockServer, path: &str, text: &str) -> httpmock::Mock<'a> {
    let api_path = format!("/repos/acme/shop/contents/{path}");
    let body = json!({ "path": path, "encoding": "base64", "content": github_base64(text) });
    server.mock(move |when, then| {
        when.method(GET).path(api_path).query_param("ref", "main");
        then.status(200).json_body(body);
    })
}

#[test]
fn analyze_resolves_dto_through_github_api() -> anyhow::Result<()> {
    let server = MockServer::start();
    mock_snapshot(&server);
    let controller = mock_file(&server, "app/controller/UserController.java", USER_CONTROLLER);
    let dto = mock_file(&server, "app/dto/UserDTO.java", USER_DTO);

    let client = GitHubClient::new(&settings_for(&server))?;
    let cache = ContentCache::new();
    let analyzer = Analyzer::new(&client, &cache);
    let repo = RepoRef::new("acme", "shop", "main");

    let results = analyzer.analyze(&repo, None)?;
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].content,
        "@RestController public class UserController { @PostMapping(\"/users\") public void create(@RequestBody UserDTO user) { } }"
    );
    assert_eq!(
        results[0].param_sources,
        vec!["@Data public class UserDTO { private String name; private Integer age; }"]
    );
    assert!(results[0].return_sources.is_empty());

    analyzer.analyze(&repo, None)?;
    controller.assert_hits(1);
    dto.assert_hits(1);
    Ok(())
}

#[test]
fn missing_branch_fails_the_call() -> anyhow::Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/shop/branches/nope");
        then.status(404).json_body(json!({ "message": "Branch not found" }));
    });
    let tree = server.mock(|when, then| {
        when.method(GET).path_contains("/git/trees/");
        then.status(200).json_body(json!({ "tree": [] }));
    });

    let client = GitHubClient::new(&settings_for(&server))?;
    let cache = ContentCache::new();
    let err = Analyzer::new(&client, &cache)
        .analyze_controllers(&RepoRef::new("acme", "shop", "nope"), None)
        .unwrap_err();

    assert!(matches!(err, ScoutError::BranchNotFound { .. }));
    tree.assert_hits(0);
    Ok(())
}

#[test]
fn server_error_on_tree_is_a_transport_error() -> anyhow::Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/shop/branches/main");
        then.status(200).json_body(json!({ "commit": { "sha": "abc" } }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/shop/git/trees/abc");
        then.status(502);
    });

    let client = GitHubClient::new(&settings_for(&server))?;
    let cache = ContentCache::new();
    let err = Analyzer::new(&client, &cache)
        .analyze_project_overview(&RepoRef::new("acme", "shop", "main"))
        .unwrap_err();
    assert!(matches!(err, ScoutError::Transport { status: 502, .. }));
    Ok(())
}

#[test]
fn overview_and_file_listing() -> anyhow::Result<()> {
    let server = MockServer::start();
    mock_snapshot(&server);
    mock_file(&server, "app/controller/UserController.java", USER_CONTROLLER);
    mock_file(&server, "pom.xml", "<project>\n    <artifactId>shop</artifactId>\n</project>\n");

    let client = GitHubClient::new(&settings_for(&server))?;
    let cache = ContentCache::new();
    let repo = RepoRef::new("acme", "shop", "main");

    let overview = Analyzer::new(&client, &cache).analyze_project_overview(&repo)?;
    assert_eq!(overview.controllers.len(), 1);
    assert_eq!(overview.profiles.len(), 1);
    assert_eq!(overview.profiles[0].name, "pom.xml");
    assert_eq!(
        overview.profiles[0].content,
        "<project> <artifactId>shop</artifactId> </project>"
    );

    let urls = list_download_urls(&client, &repo, Some("app"))?;
    assert_eq!(
        urls,
        vec![
            format!("{}/raw/acme/shop/main/app/controller/UserController.java", server.base_url()),
            format!("{}/raw/acme/shop/main/app/dto/UserDTO.java", server.base_url()),
        ]
    );
    Ok(())
}

#[test]
fn missing_dto_content_leaves_controller_analyzed() -> anyhow::Result<()> {
    let server = MockServer::start();
    mock_snapshot(&server);
    mock_file(&server, "app/controller/UserController.java", USER_CONTROLLER);
    let dto = server.mock(|when, then| {
        when.method(GET).path("/repos/acme/shop/contents/app/dto/UserDTO.java");
        then.status(404).json_body(json!({ "message": "Not Found" }));
    });

    let client = GitHubClient::new(&settings_for(&server))?;
    let cache = ContentCache::new();
    let repo = RepoRef::new("acme", "shop", "main");
    let results = Analyzer::new(&client, &cache).analyze(&repo, None)?;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].path, "app/controller/UserController.java");
    assert!(results[0].param_sources.is_empty());
    assert!(results[0].unresolved.is_empty());
    dto.assert_hits(1);
    assert_eq!(cache.stats().entries, 1);
    Ok(())
}
