use numseq::{factorial, factorial_tail};

fn main() {
    for i in 0..35 {
        let n = factorial(i);
        assert_eq!(n, factorial_tail(i));
        println!("{}! = {}", i, n);
    }
}
