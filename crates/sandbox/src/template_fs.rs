// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builtin starter projects.
//!
//! Each template is a small self-contained project with a manifest, an
//! implementation file, and a test file. The coder role is prompted against
//! exactly these contents, so line numbers in generated hunks line up.

use mend_core::Template;
use std::path::Path;

/// Write the starter files for `template` into `repo`.
pub fn materialize(template: Template, repo: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(repo)?;
    match template {
        Template::React => react(repo),
        Template::Express => express(repo),
        Template::Flask => flask(repo),
    }
}

fn write(repo: &Path, rel: &str, content: &str) -> std::io::Result<()> {
    let path = repo.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}

fn react(repo: &Path) -> std::io::Result<()> {
    write(
        repo,
        "package.json",
        r#"{
  "name": "mend-react-app",
  "version": "1.0.0",
  "scripts": {
    "test": "jest"
  },
  "dependencies": {
    "react": "^18.0.0",
    "react-dom": "^18.0.0"
  },
  "devDependencies": {
    "jest": "^27.0.0"
  }
}
"#,
    )?;
    write(
        repo,
        "src/calculator.js",
        r#"class Calculator {
  add(a, b) {
    return a + b;
  }

  subtract(a, b) {
    return a - b;
  }

  multiply(a, b) {
    return a * b;
  }
}

export default Calculator;
"#,
    )?;
    write(
        repo,
        "src/calculator.test.js",
        r#"import Calculator from './calculator';

describe('Calculator', () => {
  let calc;

  beforeEach(() => {
    calc = new Calculator();
  });

  test('adds two numbers', () => {
    expect(calc.add(2, 3)).toBe(5);
  });

  test('subtracts two numbers', () => {
    expect(calc.subtract(5, 3)).toBe(2);
  });

  test('multiplies two numbers', () => {
    expect(calc.multiply(4, 3)).toBe(12);
  });
});
"#,
    )
}

fn express(repo: &Path) -> std::io::Result<()> {
    write(
        repo,
        "package.json",
        r#"{
  "name": "mend-express-app",
  "version": "1.0.0",
  "scripts": {
    "test": "jest",
    "start": "node src/app.js"
  },
  "dependencies": {
    "express": "^4.17.0"
  },
  "devDependencies": {
    "jest": "^27.0.0",
    "supertest": "^6.0.0"
  }
}
"#,
    )?;
    write(
        repo,
        "src/app.js",
        r#"const express = require('express');
const app = express();
const port = process.env.PORT || 3000;

app.use(express.json());

app.get('/', (req, res) => {
  res.json({ message: 'Hello World' });
});

app.listen(port, () => {
  console.log(`Server running on port ${port}`);
});
"#,
    )?;
    write(
        repo,
        "src/app.test.js",
        r#"const request = require('supertest');
const app = require('./app');

describe('Express App', () => {
  test('GET / returns hello world', async () => {
    const response = await request(app).get('/');
    expect(response.status).toBe(200);
    expect(response.body.message).toBe('Hello World');
  });
});
"#,
    )
}

fn flask(repo: &Path) -> std::io::Result<()> {
    write(
        repo,
        "requirements.txt",
        "flask==2.0.0\npytest==6.0.0\n",
    )?;
    write(
        repo,
        "app.py",
        r#"from flask import Flask, jsonify, request

app = Flask(__name__)

@app.route('/')
def hello():
    return jsonify({'message': 'Hello World'})

if __name__ == '__main__':
    app.run(debug=True)
"#,
    )?;
    write(
        repo,
        "test_app.py",
        r#"import pytest
from app import app

@pytest.fixture
def client():
    app.config['TESTING'] = True
    with app.test_client() as client:
        yield client

def test_hello(client):
    response = client.get('/')
    assert response.status_code == 200
    assert response.json['message'] == 'Hello World'
"#,
    )
}

#[cfg(test)]
#[path = "template_fs_tests.rs"]
mod tests;
