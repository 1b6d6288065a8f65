//! Example: Fetch various locators and display results
//!
//! Run with: cargo run -p pagekit --example fetch_locators
//!
//! Covers each scheme branch plus the fallback for unparsable input.

use pagekit::{fetch_response, parse, strip_tags, FetchResponse, Scheme};

/// Test case definition
struct TestCase {
    locator: &'static str,
    description: &'static str,
    expect_scheme: Scheme,
    expect_contains: Option<&'static str>,
}

/// Define test cases here
const TEST_CASES: &[TestCase] = &[
    TestCase {
        locator: "http://example.com/",
        description: "Plain HTTP page",
        expect_scheme: Scheme::Http,
        expect_contains: Some("Example Domain"),
    },
    TestCase {
        locator: "https://example.org/",
        description: "HTTPS page (TLS upgrade)",
        expect_scheme: Scheme::Https,
        expect_contains: Some("Example Domain"),
    },
    TestCase {
        locator: "example.com",
        description: "Implicit http with synthesized path",
        expect_scheme: Scheme::Http,
        expect_contains: Some("Example Domain"),
    },
    TestCase {
        locator: "data:text/html,<h1>Inline</h1> payload",
        description: "Inline data, no network",
        expect_scheme: Scheme::Data,
        expect_contains: Some("Inline payload"),
    },
    TestCase {
        locator: "not a url",
        description: "Unparsable input falls back to the default target",
        expect_scheme: Scheme::Https,
        expect_contains: None,
    },
];

#[tokio::main]
async fn main() {
    println!("PageKit Locator Examples");
    println!("========================\n");

    let mut passed = 0;
    let mut failed = 0;

    for (i, case) in TEST_CASES.iter().enumerate() {
        let target = parse(case.locator);
        println!("{}. {}", i + 1, case.description);
        println!("   Locator: {}", case.locator);
        println!("   Target: {}", target);

        match fetch_response(&target).await {
            Ok(response) => {
                let check_result = check_expectations(case, &response);
                print_response_summary(&response);

                if check_result {
                    println!("   ✓ PASS\n");
                    passed += 1;
                } else {
                    println!("   ✗ FAIL (expectations not met)\n");
                    failed += 1;
                }
            }
            Err(e) => {
                println!("   Error: {}", e);
                println!("   ✗ FAIL\n");
                failed += 1;
            }
        }
    }

    println!("========================");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

fn print_response_summary(response: &FetchResponse) {
    if let Some(status) = response.status_code {
        println!("   Status: {}", status);
    }

    if let Some(ref ct) = response.content_type {
        println!("   Content-Type: {}", ct);
    }

    println!("   Size: {} bytes", response.size);

    let text = strip_tags(&response.content);
    let preview = text.chars().take(100).collect::<String>();
    let preview = preview.replace(['\r', '\n'], " ");
    println!(
        "   Preview: {}{}",
        preview.trim(),
        if text.len() > 100 { "..." } else { "" }
    );
}

fn check_expectations(case: &TestCase, response: &FetchResponse) -> bool {
    if response.scheme != Some(case.expect_scheme) {
        println!(
            "   Expected scheme '{}', got '{:?}'",
            case.expect_scheme, response.scheme
        );
        return false;
    }

    if let Some(expected_text) = case.expect_contains {
        if !strip_tags(&response.content).contains(expected_text) {
            println!("   Expected content to contain '{}'", expected_text);
            return false;
        }
    }

    true
}
