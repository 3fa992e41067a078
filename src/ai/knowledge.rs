//! Static keyword-matched knowledge base used as a mid-chain fallback when
//! the generative providers are unavailable.

const REACT_DOC: &str = r#"React is a JavaScript library for building user interfaces with reusable components.

Key Features:
• Component-based architecture - Break UI into reusable pieces
• Virtual DOM - Efficient rendering and performance optimization
• JSX - JavaScript XML for writing UI elements
• State Management - Manage component data with useState hook
• Lifecycle Hooks - useEffect, useContext, useReducer, etc.
• Unidirectional Data Flow - Predictable data management

Installation:
```bash
npx create-react-app my-app
cd my-app
npm start
```

Basic Component Example:
```jsx
function MyComponent() {
  const [count, setCount] = useState(0);

  return (
    <div>
      <p>Count: {count}</p>
      <button onClick={() => setCount(count + 1)}>Increment</button>
    </div>
  );
}
```

Best Practices:
• Use functional components with hooks
• Keep components small and focused
• Use PropTypes or TypeScript for type checking
• Memoize expensive computations with useMemo
• Use lazy loading for code splitting"#;

const JAVASCRIPT_DOC: &str = r#"JavaScript is a versatile programming language that powers interactive web applications.

Core Concepts:
• Variables: let, const, var
• Data Types: String, Number, Boolean, Object, Array, null, undefined
• Functions: Regular, Arrow, Async/Await
• Objects & Prototypes - Inheritance model
• Promises - Handling asynchronous operations
• ES6+ Features - Classes, Destructuring, Spread operator

Async/Await Example:
```javascript
async function fetchData() {
  try {
    const response = await fetch('https://api.example.com/data');
    const data = await response.json();
    return data;
  } catch (error) {
    console.error('Error:', error);
  }
}
```

Best Practices:
• Always use 'const' by default
• Use arrow functions for cleaner syntax
• Use async/await instead of .then()
• Avoid callback hell with proper error handling
• Use const for immutability
• Destructuring for cleaner code"#;

const CSS_DOC: &str = r#"CSS (Cascading Style Sheets) is used for styling web pages and creating layouts.

Layout Systems:
• Flexbox: 1D layout for rows/columns
• Grid: 2D layout for complex designs
• Positioning: static, relative, absolute, fixed
• Box Model: margin, border, padding, content

Flexbox Example:
```css
.container {
  display: flex;
  flex-direction: row;
  justify-content: space-between;
  align-items: center;
  gap: 1rem;
}
```

Grid Example:
```css
.grid {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(250px, 1fr));
  gap: 2rem;
}
```

Modern Features:
• CSS Variables: --color-primary
• Animations & Transitions
• Media Queries for responsive design
• CSS Filters for effects
• Backdrop filters for blur effects
• CSS Gradients for backgrounds"#;

const API_DOC: &str = r#"REST APIs (Representational State Transfer) are web services for data exchange.

HTTP Methods:
• GET - Retrieve data (safe, idempotent)
• POST - Create new data
• PUT/PATCH - Update existing data
• DELETE - Remove data

API Request Example:
```javascript
const response = await fetch('https://api.example.com/users', {
  method: 'POST',
  headers: {
    'Content-Type': 'application/json',
    'Authorization': 'Bearer YOUR_TOKEN'
  },
  body: JSON.stringify({
    name: 'John Doe',
    email: 'john@example.com'
  })
});

const data = await response.json();
```

Best Practices:
• Use proper HTTP status codes (200, 201, 400, 401, 404, 500)
• Include error messages in responses
• Use JSON for data format
• Implement rate limiting
• Add API documentation (Swagger/OpenAPI)
• Use CORS headers for cross-origin requests"#;

const SECURITY_DOC: &str = r#"Web Security Best Practices for protecting applications and user data.

Common Vulnerabilities:
• XSS (Cross-Site Scripting) - Inject malicious scripts
• CSRF (Cross-Site Request Forgery) - Unauthorized actions
• SQL Injection - Malicious SQL queries
• Man-in-the-Middle (MITM) - Intercept communications
• DDoS - Denial of Service attacks

Protection Strategies:
• Use HTTPS/TLS for encryption
• Sanitize user input on frontend and backend
• Use Content Security Policy (CSP)
• Implement CORS properly
• Use HTTPOnly cookies for sensitive data
• Hash and salt passwords (bcrypt, argon2)
• Keep dependencies updated
• Use environment variables for secrets
• Implement rate limiting
• Add security headers (X-Frame-Options, X-Content-Type-Options)

Code Example:
```javascript
// Sanitize user input
const sanitized = userInput.replace(/[<>]/g, '');

// Use parameterized queries for databases
const query = 'SELECT * FROM users WHERE id = ?';
db.query(query, [userId]);

// Set secure headers
app.use(helmet()); // Express.js security middleware
```"#;

const PYTHON_DOC: &str = r#"Python is a high-level, versatile programming language.

Core Features:
• Simple, readable syntax
• Dynamic typing
• Extensive standard library
• Object-oriented and functional programming
• Decorators and generators

Common Frameworks:
• Flask/Django for web development
• NumPy/Pandas for data science
• TensorFlow/PyTorch for machine learning
• Requests for HTTP operations

Flask Example:
```python
from flask import Flask, jsonify, request

app = Flask(__name__)

@app.route('/api/data', methods=['GET'])
def get_data():
    return jsonify({'message': 'Hello, World!'})

@app.route('/api/data', methods=['POST'])
def post_data():
    data = request.get_json()
    return jsonify(data), 201

if __name__ == '__main__':
    app.run(debug=True)
```

Best Practices:
• Use virtual environments
• Follow PEP 8 style guide
• Use type hints (Python 3.5+)
• Write unit tests with pytest
• Use docstrings for documentation"#;

/// Entry order is the match priority: the first keyword contained in the
/// input wins.
const KNOWLEDGE_BASE: &[(&str, &str)] = &[
    ("react", REACT_DOC),
    ("javascript", JAVASCRIPT_DOC),
    ("css", CSS_DOC),
    ("api", API_DOC),
    ("security", SECURITY_DOC),
    ("python", PYTHON_DOC),
];

/// Case-insensitive substring scan over the keyword table.
pub fn lookup(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    KNOWLEDGE_BASE
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, content)| *content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_keywords_case_insensitively() {
        assert_eq!(lookup("Tell me about React"), Some(REACT_DOC));
        assert_eq!(lookup("WHAT IS CSS?"), Some(CSS_DOC));
    }

    #[test]
    fn first_entry_in_table_order_wins() {
        assert_eq!(lookup("react or python, which first?"), Some(REACT_DOC));
    }

    #[test]
    fn matches_keywords_inside_larger_words() {
        // Plain containment: "api" occurs inside "capital".
        assert_eq!(lookup("what is the capital of France"), Some(API_DOC));
    }

    #[test]
    fn returns_none_without_a_keyword() {
        assert_eq!(lookup("tell me a joke"), None);
        assert_eq!(lookup(""), None);
    }
}
