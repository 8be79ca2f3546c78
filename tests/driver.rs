//! End-to-end tests: compile Marklar programs with the real binary, run the
//! produced executables, and check their exit status.
//!
//! The whole table runs inside a single test function since the driver
//! writes its intermediate files under fixed names in the working directory,
//! so compilations must not race each other.
use std::error::Error;

use test_utils::{compile, compile_and_run, toolchain_available};

#[test]
fn compile_and_run_programs() -> Result<(), Box<dyn Error>> {
    if !toolchain_available() {
        eprintln!("skipping: opt/llc/gcc not available");
        return Ok(());
    }

    let table: &[(&str, &str, i32)] = &[
        ("basic_return", "marklar main(){ return 3; }", 3),
        (
            "decl_sum",
            "marklar main(){ marklar i=2; marklar j=5; return i+j; }",
            7,
        ),
        (
            "decl_sum_chain",
            "marklar main(){ marklar i=2; marklar j=5; return i+j+6; }",
            13,
        ),
        (
            "if_return",
            "marklar main(){ if (3<4){return 1;} return 0; }",
            1,
        ),
        (
            "while_loop",
            "marklar main(){ marklar a=2; marklar b=6; while(a<b){ a = a+1; } return a; }",
            6,
        ),
        (
            "logical_or",
            "marklar main(){ marklar a=0; marklar b=4; if ((a==0)||(b==0)){return 2;} return 1; }",
            2,
        ),
        (
            "logical_and",
            "marklar main(){ marklar a=0; marklar b=4; if ((a==0)&&(b==0)){return 2;} return 1; }",
            1,
        ),
        (
            "chained_calls",
            "marklar unaryFunc(marklar n){return n+1;} \
             marklar binaryFunc(marklar a, marklar b){return unaryFunc((a*a)+(b*b));} \
             marklar main(){return binaryFunc(1,5);}",
            27,
        ),
        (
            "scoping",
            "marklar bar(){ marklar a=5; return a; } \
             marklar foo(){ marklar a=4; return a; } \
             marklar main(){ marklar a=3; return a; }",
            3,
        ),
        (
            "if_else",
            "marklar main(){ marklar a=3; marklar b=4; if (a>b){ return 1; } else { return 0; } return 2; }",
            0,
        ),
        (
            "while_with_return",
            "marklar main(){ while (1==1) { return 1; } return 0; }",
            1,
        ),
        (
            "early_return",
            "marklar main(){ return 2; while (1==1) { return 1; } return 0; }",
            2,
        ),
        (
            "if_two_returns",
            "marklar main(){ if (1==1) { return 1; return 2; } else { return 0; return 5; } return 0; }",
            1,
        ),
        (
            "modulo",
            "marklar main(){ marklar a = 5 % 3; if (a==2){ return 1; } return 0; }",
            1,
        ),
        ("division", "marklar main(){ marklar i = 5 / 3; return i; }", 1),
        (
            "multiplication",
            "marklar main(){ marklar i = 5 * 3; return i; }",
            15,
        ),
        (
            "call_in_condition",
            "marklar func1(marklar a){ return a + 5; } \
             marklar main(){ if (func1(10) < 15) { return 1; } return func1(10); }",
            15,
        ),
    ];

    for (name, source, expected) in table {
        let exit = compile_and_run(source, name)?;
        assert_eq!(*expected, exit, "program '{name}' returned {exit}");
    }

    Ok(())
}

#[test]
fn parse_failure_exits_with_2() -> Result<(), Box<dyn Error>> {
    assert_eq!(2, compile("marklar main(){", "parse_failure")?);
    Ok(())
}

#[test]
fn codegen_failure_exits_with_2() -> Result<(), Box<dyn Error>> {
    assert_eq!(2, compile("marklar main(){ return nope; }", "codegen_failure")?);
    Ok(())
}

#[test]
fn missing_return_exits_with_2() -> Result<(), Box<dyn Error>> {
    assert_eq!(2, compile("marklar main(){}", "missing_return")?);
    Ok(())
}
