use crate::element::Element;

/// Cache-friendly matrix multiplication using i-k-j loop order.
///
/// The innermost loop walks both B and C sequentially (stride 1). Strassen
/// uses this below its leaf size, and the tests and the driver use it as
/// the independent reference every strategy is checked against.
///
/// # Arguments
///
/// * `a` - Matrix A (m × k), row-major
/// * `b` - Matrix B (k × n), row-major
/// * `c` - Matrix C (m × n), row-major, accumulated into (C += A * B)
/// * `m` - Rows of A and C
/// * `n` - Columns of B and C
/// * `k` - Columns of A, rows of B
pub fn matmul_ikj<T: Element>(a: &[T], b: &[T], c: &mut [T], m: usize, n: usize, k: usize) {
    assert_eq!(a.len(), m * k, "A: expected {}x{}={} elements", m, k, m * k);
    assert_eq!(b.len(), k * n, "B: expected {}x{}={} elements", k, n, k * n);
    assert_eq!(c.len(), m * n, "C: expected {}x{}={} elements", m, n, m * n);

    for i in 0..m {
        for p in 0..k {
            let a_ip = a[i * k + p];
            for j in 0..n {
                c[i * n + j] += a_ip * b[p * n + j];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_2x3_times_3x2() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // 2x3
        let b = vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0]; // 3x2
        let mut c = vec![0.0; 4];

        matmul_ikj(&a, &b, &mut c, 2, 2, 3);

        assert_eq!(c, vec![58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_accumulates() {
        let a = vec![1i64, 0, 0, 1];
        let b = vec![2i64, 3, 4, 5];
        let mut c = vec![10i64; 4];

        matmul_ikj(&a, &b, &mut c, 2, 2, 2);

        assert_eq!(c, vec![12, 13, 14, 15]);
    }
}
