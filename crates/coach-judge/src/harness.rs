//! Target languages and their submission harnesses.
//!
//! User code arrives as a bare `solve` function; the judge runs whole
//! programs. Each language's harness supplies the program entry point and the
//! stdin parsing (first line `n`, second line the array) around the user's
//! code before transmission.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A programming language the judge can grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Cpp,
    Python,
    JavaScript,
    Java,
}

/// Error for language identifiers the judge does not support.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("unsupported language: {0}")]
pub struct UnsupportedLanguage(pub String);

impl Language {
    /// The judge's numeric language identifier.
    pub fn id(self) -> u32 {
        match self {
            Language::Cpp => 54,
            Language::Python => 71,
            Language::JavaScript => 63,
            Language::Java => 62,
        }
    }

    /// Embeds the user's code in this language's harness.
    pub fn wrap(self, code: &str) -> String {
        match self {
            Language::Cpp => wrap_cpp(code),
            Language::Python => wrap_python(code),
            Language::JavaScript => wrap_javascript(code),
            Language::Java => wrap_java(code),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Cpp => "cpp",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::Java => "java",
        };
        f.write_str(name)
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cpp" => Ok(Language::Cpp),
            "python" => Ok(Language::Python),
            "javascript" | "js" => Ok(Language::JavaScript),
            "java" => Ok(Language::Java),
            other => Err(UnsupportedLanguage(other.to_string())),
        }
    }
}

fn wrap_javascript(code: &str) -> String {
    format!(
        r#"{code}

const input = require('fs').readFileSync('/dev/stdin').toString().trim();
const [n, arr] = input.split('\n');
const result = solve(parseInt(n), arr);
console.log(result);
"#
    )
}

fn wrap_python(code: &str) -> String {
    format!(
        r#"{code}

n = int(input())
arr = list(map(int, input().split()))
result = solve(n, arr)
print(result)
"#
    )
}

fn wrap_cpp(code: &str) -> String {
    format!(
        r#"#include <bits/stdc++.h>
#include <vector>
#include <string>
#include <sstream>
using namespace std;

{code}

int main() {{
    int n;
    cin >> n;
    vector<int> arr(n);
    for(int i = 0; i < n; i++) {{
        cin >> arr[i];
    }}
    cout << solve(n, arr) << endl;
    return 0;
}}
"#
    )
}

fn wrap_java(code: &str) -> String {
    format!(
        r#"import java.util.Scanner;
import java.util.Arrays;

public class Main {{
    {code}

    public static void main(String[] args) {{
        Scanner scanner = new Scanner(System.in);
        int n = scanner.nextInt();
        int[] arr = new int[n];
        for(int i = 0; i < n; i++) {{
            arr[i] = scanner.nextInt();
        }}
        System.out.println(solve(n, arr));
        scanner.close();
    }}
}}
"#
    )
}
