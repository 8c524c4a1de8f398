//! Build-file texts used across harnesses.
//!
//! Recipes need literal tabs, hence the `\t` escapes.

/// Shared group library. Defines a `concat` recipe and no targets, so the
/// first rule of the including build-file stays the default goal.
pub const GROUPLIB_MK: &str = "\
# group library
CAT ?= cat

define concat
$(CAT) $^ > $@
endef
";

/// Default target builds `output.txt` from the two generated sources.
pub const CASE_OUTPUT_MK: &str = "\
include grouplib.mk

output.txt: source.1 source.2
\t$(concat)
";

/// Default target fails with a message on stderr.
pub const CASE_FAILING_MK: &str = "\
include grouplib.mk

all:
\t@echo failing on purpose >&2
\t@exit 3
";

/// Two targets that each print their own name.
pub const CASE_NAMED_TARGETS_MK: &str = "\
include grouplib.mk

build:
\t@echo building
test:
\t@echo testing
";

/// Writes a group library layout like the one the harness was built for:
///
/// ```text
/// <root>/grouplib.mk
/// <root>/unit_tests/<case>.mk
/// ```
///
/// Returns `(build_file, shared_lib)`.
pub fn write_group_layout(
    root: &std::path::Path,
    case: &str,
    contents: &str,
) -> (std::path::PathBuf, std::path::PathBuf) {
    let tests = root.join("unit_tests");
    std::fs::create_dir_all(&tests).unwrap();
    let shared_lib = root.join("grouplib.mk");
    std::fs::write(&shared_lib, GROUPLIB_MK).unwrap();
    let build_file = tests.join(format!("{case}.mk"));
    std::fs::write(&build_file, contents).unwrap();
    (build_file, shared_lib)
}
