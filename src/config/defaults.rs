//! Pinned versions and fallback content used when no configuration overrides them

pub const DJANGO_VERSION: &str = "6.0";
pub const DRF_VERSION: &str = "3.16.1";

pub const GITIGNORE_URL: &str = "https://www.toptal.com/developers/gitignore/api/django";
pub const GITIGNORE_TIMEOUT_SECS: u64 = 10;

/// Extra requirements for the Docker/observability stack
pub const DOCKER_REQUIREMENTS: &[&str] = &[
    "celery==5.5.2",
    "django-celery-beat @ git+https://github.com/celery/django-celery-beat.git@main",
    "django-debug-toolbar==5.2.0",
    "django-extensions==4.1",
    "django-prometheus==2.3.1",
    "flower==2.0.1",
    "gunicorn==23.0.0",
    "ipython==9.2.0",
    "psycopg[binary]==3.3.2",
    "redis==6.2.0",
    "watchfiles==1.1.1",
];

/// Written when the .gitignore service cannot be reached
pub const FALLBACK_GITIGNORE: &str = "\
# Byte-compiled / optimized / DLL files
__pycache__/
*.py[cod]
*$py.class

# Distribution / packaging
*.egg-info/
*.egg
dist/
build/
sdist/

# Virtual environments
.venv/
venv/
env/

# Django
*.log
*.pot
local_settings.py
db.sqlite3
db.sqlite3-journal
media/
staticfiles/

# IDE
.idea/
.vscode/
*.swp
*.swo

# OS
.DS_Store
Thumbs.db

# Environment variables
.env
.env.*
";

/// Python keywords, as reported by `keyword.kwlist`
pub const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break",
    "class", "continue", "def", "del", "elif", "else", "except", "finally", "for",
    "from", "global", "if", "import", "in", "is", "lambda", "nonlocal", "not",
    "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

/// Names that clash with Django itself or the standard library modules it imports
pub const DJANGO_RESERVED: &[&str] = &["django", "test", "site", "admin"];

/// Project package name used when the user just presses enter
pub const DEFAULT_PROJECT_NAME: &str = "config";

/// App generated to hold the custom user model
pub const AUTH_APP_NAME: &str = "auth_app";
