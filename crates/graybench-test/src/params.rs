//! Regression test parameters and checks

use graybench_core::Raster;

/// Regression test parameters
///
/// Tracks the test name, current index and success status. Every check
/// increments the index so failures can be located in the test body.
pub struct RegParams {
    /// Name of the test (e.g., "grayscale")
    pub test_name: String,
    /// Current test index (incremented before each test)
    index: usize,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    pub fn new(test_name: &str) -> Self {
        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");

        Self {
            test_name: test_name.to_string(),
            index: 0,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    fn fail(&mut self, msg: String) {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
    }

    /// Check that `actual` is within `delta` of `expected`.
    ///
    /// Counts, flags and pixel values are all compared as `f64`; booleans go
    /// in as 0 or 1.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.fail(msg);
            false
        } else {
            true
        }
    }

    /// Compare two rasters for exact equality
    ///
    /// Size, channel layout and every sample must match.
    pub fn compare_raster(&mut self, raster1: &Raster, raster2: &Raster) -> bool {
        self.index += 1;

        if !raster1.sizes_equal(raster2) || raster1.channels() != raster2.channels() {
            let msg = format!(
                "Failure in {}_reg: raster comparison for index {} - layout mismatch \
                 ({}x{}x{} vs {}x{}x{})",
                self.test_name,
                self.index,
                raster1.width(),
                raster1.height(),
                raster1.channels().count(),
                raster2.width(),
                raster2.height(),
                raster2.channels().count()
            );
            self.fail(msg);
            return false;
        }

        let c = raster1.channels().count() as usize;
        let mismatch = raster1
            .data()
            .chunks_exact(c)
            .zip(raster2.data().chunks_exact(c))
            .position(|(a, b)| a != b);

        if let Some(i) = mismatch {
            let w = raster1.width() as usize;
            let msg = format!(
                "Failure in {}_reg: raster comparison for index {} - sample mismatch at ({}, {})",
                self.test_name,
                self.index,
                i % w,
                i / w
            );
            self.fail(msg);
            return false;
        }

        true
    }

    /// Compare two binary data arrays
    ///
    /// # Returns
    ///
    /// `true` if data is identical, `false` otherwise.
    pub fn compare_strings(&mut self, data1: &[u8], data2: &[u8]) -> bool {
        self.index += 1;

        if data1 != data2 {
            let msg = format!(
                "Failure in {}_reg: string comparison for index {}\n\
                 sizes: {} vs {}",
                self.test_name,
                self.index,
                data1.len(),
                data2.len()
            );
            self.fail(msg);
            false
        } else {
            true
        }
    }

    /// Clean up and report results
    ///
    /// # Returns
    ///
    /// `true` if all tests passed, `false` if any failed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all tests have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
