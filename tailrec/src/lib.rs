//! `tailrec! { .. }` turns a group of mutually tail-recursive functions into a
//! single loop, so recursion depth no longer maps to stack depth.
//!
//! ```rust,ignore
//! tailrec! {
//!     pub fn fib(n: u64) -> BigUint {
//!         go(n, BigUint::zero(), BigUint::one())
//!     }
//!
//!     fn go(n: u64, cur: BigUint, nxt: BigUint) -> BigUint {
//!         if n == 0 {
//!             cur
//!         } else {
//!             let sum = &cur + &nxt;
//!             go(n - 1, nxt, sum)
//!         }
//!     }
//! }
//! ```

extern crate proc_macro;

use proc_macro2::{Span, TokenStream};
use quote::{quote, quote_spanned};
use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use syn::visit_mut::{self, VisitMut};
use syn::{
    parse_quote, Block, Expr, FnArg, Ident, ItemFn, Lifetime, Pat, ReturnType, Stmt, Type,
    Visibility,
};

struct TailRec {
    fns: Vec<ItemFn>,
}

impl Parse for TailRec {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut fns = vec![];
        while !input.is_empty() {
            fns.push(input.parse()?);
        }
        Ok(TailRec { fns })
    }
}

#[proc_macro]
pub fn tailrec(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    expand(input.into()).unwrap_or_else(|x| x).into()
}

fn expand(input: TokenStream) -> Result<TokenStream, TokenStream> {
    let TailRec { fns } = syn::parse2(input).map_err(|err| err.to_compile_error())?;

    if fns.is_empty() {
        return Err(quote! {
            compile_error!("tailrec! needs at least one function definition");
        });
    }
    if let Some(lint) = fns.iter().find_map(lint_fn) {
        return Err(lint);
    }
    if let Some(helper) = fns
        .iter()
        .skip(1)
        .find(|fun| !matches!(fun.vis, Visibility::Inherited))
    {
        let span = helper.vis.span();
        return Err(quote_spanned! {span=>
            compile_error!("only the first fn in tailrec!{} may have a visibility");
        });
    }

    let next_enum = Ident::new("__NextCall", Span::call_site());
    let next_enum = &next_enum;

    let entry = &fns[0];
    let output = match &entry.sig.output {
        ReturnType::Default => quote!(()),
        ReturnType::Type(_, ty) => quote!(#ty),
    };

    let names: Vec<Ident> = fns.iter().map(|fun| fun.sig.ident.clone()).collect();
    let args: Vec<Vec<Ident>> = fns.iter().map(arg_idents).collect::<Result<_, _>>()?;

    let variants = fns.iter().map(|fun| {
        let name = &fun.sig.ident;
        let tys = fun.sig.inputs.iter().filter_map(|arg| match arg {
            FnArg::Typed(arg) => Some(&arg.ty),
            FnArg::Receiver(_) => None,
        });
        quote!(#name(#(#tys),*))
    });
    let dispatch = names.iter().zip(&args).map(|(name, args)| {
        quote!(#next_enum::#name(#(#args),*) => #name(#(#args),*))
    });
    let rewritten = fns
        .iter()
        .map(|fun| rewrite_fn(fun.clone(), next_enum, &names));

    let ItemFn { attrs, vis, sig, .. } = entry;
    let entry_name = &sig.ident;
    let entry_args = &args[0];

    Ok(quote! {
        #(#attrs)*
        #vis #sig {
            #[allow(non_camel_case_types)]
            enum #next_enum {
                #(#variants,)*
                __Done(#output),
            }

            #(#rewritten)*

            let mut next = #next_enum::#entry_name(#(#entry_args),*);
            loop {
                next = match next {
                    #(#dispatch,)*
                    #next_enum::__Done(res) => return res,
                }
            }
        }
    })
}

fn lint_fn(fun: &ItemFn) -> Option<TokenStream> {
    let sig = &fun.sig;
    if !sig.generics.params.is_empty() {
        let span = sig.generics.params.span();
        Some(quote_spanned! {span=>
            compile_error!("generic functions are not supported by tailrec!");
        })
    } else if let Some(where_clause) = &sig.generics.where_clause {
        let span = where_clause.span();
        Some(quote_spanned! {span=>
            compile_error!("where clauses are not supported by tailrec!");
        })
    } else if let Some(variadic) = &sig.variadic {
        let span = variadic.span();
        Some(quote_spanned! {span=>
            compile_error!("variadic functions are not supported by tailrec!");
        })
    } else if let Some(abi) = &sig.abi {
        let span = abi.span();
        Some(quote_spanned! {span=>
            compile_error!("explicit ABIs are not supported by tailrec!");
        })
    } else if let Some(asyncness) = &sig.asyncness {
        let span = asyncness.span();
        Some(quote_spanned! {span=>
            compile_error!("async functions are not supported by tailrec!");
        })
    } else {
        None
    }
}

/// Argument names of `fun`, in order. Only plain `name: Type` (optionally
/// `mut name`) arguments can be moved through the trampoline.
fn arg_idents(fun: &ItemFn) -> Result<Vec<Ident>, TokenStream> {
    fun.sig
        .inputs
        .iter()
        .map(|arg| match arg {
            FnArg::Receiver(recv) => {
                let span = recv.span();
                Err(quote_spanned! {span=>
                    compile_error!("`self` arguments are not supported by tailrec!");
                })
            }
            FnArg::Typed(arg) => {
                if let Some(span) = elided_lifetime(&arg.ty) {
                    return Err(quote_spanned! {span=>
                        compile_error!("tailrec! arguments need explicit lifetimes (e.g. `&'static str`)");
                    });
                }
                match &*arg.pat {
                    Pat::Ident(pat) if pat.by_ref.is_none() && pat.subpat.is_none() => {
                        Ok(pat.ident.clone())
                    }
                    pat => {
                        let span = pat.span();
                        Err(quote_spanned! {span=>
                            compile_error!("tailrec! arguments must be plain identifiers");
                        })
                    }
                }
            }
        })
        .collect()
}

/// Span of the first elided lifetime in `ty` (`&T` or `'_`). Argument types
/// are copied into the `__NextCall` enum, where elision is not allowed.
fn elided_lifetime(ty: &Type) -> Option<Span> {
    struct Finder(Option<Span>);

    impl<'ast> Visit<'ast> for Finder {
        fn visit_type_reference(&mut self, ty: &'ast syn::TypeReference) {
            if ty.lifetime.is_none() && self.0.is_none() {
                self.0 = Some(ty.and_token.span());
            }
            visit::visit_type_reference(self, ty);
        }

        fn visit_lifetime(&mut self, lifetime: &'ast Lifetime) {
            if lifetime.ident == "_" && self.0.is_none() {
                self.0 = Some(lifetime.span());
            }
        }

        fn visit_type_bare_fn(&mut self, _: &'ast syn::TypeBareFn) {}
    }

    let mut finder = Finder(None);
    finder.visit_type(ty);
    finder.0
}

/// Rewrite
///
/// ```rust,ignore
/// fn go(n: u64, acc: u64) -> u64 {
///     if n > 1 { go(n - 1, acc * n) } else { acc }
/// }
/// ```
///
/// into
///
/// ```rust,ignore
/// fn go(n: u64, acc: u64) -> __NextCall {
///     if n > 1 { __NextCall::go(n - 1, acc * n) } else { __NextCall::__Done(acc) }
/// }
/// ```
fn rewrite_fn(fun: ItemFn, next_enum: &Ident, names: &[Ident]) -> TokenStream {
    let ItemFn { sig, block, .. } = fun;
    let mut block = *block;

    ReturnRewriter { next_enum, names }.visit_block_mut(&mut block);
    let block = rewrite_tail_block(block, next_enum, names);

    let constness = &sig.constness;
    let unsafety = &sig.unsafety;
    let ident = &sig.ident;
    let inputs = &sig.inputs;
    quote!(#constness #unsafety fn #ident(#inputs) -> #next_enum #block)
}

fn rewrite_tail_block(block: Block, next_enum: &Ident, names: &[Ident]) -> Block {
    let Block {
        mut stmts,
        brace_token,
    } = block;

    match stmts.pop() {
        Some(Stmt::Expr(expr, None)) => {
            stmts.push(Stmt::Expr(rewrite_tail(expr, next_enum, names), None))
        }
        Some(stmt @ Stmt::Expr(Expr::Return(_), Some(_))) => stmts.push(stmt),
        Some(Stmt::Expr(Expr::Loop(expr_loop), Some(semi))) if !loop_breaks(&expr_loop) => {
            stmts.push(Stmt::Expr(Expr::Loop(expr_loop), Some(semi)))
        }
        Some(stmt) => {
            stmts.push(stmt);
            stmts.push(Stmt::Expr(parse_quote!(#next_enum::__Done(())), None));
        }
        None => stmts.push(Stmt::Expr(parse_quote!(#next_enum::__Done(())), None)),
    }

    Block { stmts, brace_token }
}

fn rewrite_tail(expr: Expr, next_enum: &Ident, names: &[Ident]) -> Expr {
    match expr {
        Expr::Call(call) => match group_call(&call.func, names) {
            Some(ident) => {
                let args = &call.args;
                parse_quote!(#next_enum::#ident(#args))
            }
            None => parse_quote!(#next_enum::__Done(#call)),
        },
        Expr::If(mut expr_if) => {
            expr_if.then_branch = rewrite_tail_block(expr_if.then_branch, next_enum, names);
            expr_if.else_branch = Some(match expr_if.else_branch.take() {
                Some((else_token, else_expr)) => (
                    else_token,
                    Box::new(rewrite_tail(*else_expr, next_enum, names)),
                ),
                None => (
                    Default::default(),
                    Box::new(parse_quote!({ #next_enum::__Done(()) })),
                ),
            });
            Expr::If(expr_if)
        }
        Expr::Match(mut expr_match) => {
            for arm in &mut expr_match.arms {
                let body = std::mem::replace(&mut *arm.body, Expr::Verbatim(TokenStream::new()));
                *arm.body = rewrite_tail(body, next_enum, names);
            }
            Expr::Match(expr_match)
        }
        Expr::Block(mut expr_block) => {
            expr_block.block = rewrite_tail_block(expr_block.block, next_enum, names);
            Expr::Block(expr_block)
        }
        Expr::Unsafe(mut expr_unsafe) => {
            expr_unsafe.block = rewrite_tail_block(expr_unsafe.block, next_enum, names);
            Expr::Unsafe(expr_unsafe)
        }
        Expr::Paren(paren) => rewrite_tail(*paren.expr, next_enum, names),
        // already rewritten by ReturnRewriter
        expr @ Expr::Return(_) => expr,
        expr => parse_quote!(#next_enum::__Done(#expr)),
    }
}

/// Whether a `break` can leave `expr_loop`. A loop without one diverges and
/// needs no `__Done` after it.
fn loop_breaks(expr_loop: &syn::ExprLoop) -> bool {
    struct Breaks<'a> {
        label: Option<&'a Lifetime>,
        depth: usize,
        found: bool,
    }

    impl<'ast> Visit<'ast> for Breaks<'_> {
        fn visit_expr_break(&mut self, brk: &'ast syn::ExprBreak) {
            match &brk.label {
                None => self.found |= self.depth == 0,
                Some(label) => self.found |= self.label == Some(label),
            }
            visit::visit_expr_break(self, brk);
        }

        fn visit_expr_loop(&mut self, expr: &'ast syn::ExprLoop) {
            self.depth += 1;
            visit::visit_expr_loop(self, expr);
            self.depth -= 1;
        }

        fn visit_expr_while(&mut self, expr: &'ast syn::ExprWhile) {
            self.depth += 1;
            visit::visit_expr_while(self, expr);
            self.depth -= 1;
        }

        fn visit_expr_for_loop(&mut self, expr: &'ast syn::ExprForLoop) {
            self.depth += 1;
            visit::visit_expr_for_loop(self, expr);
            self.depth -= 1;
        }

        fn visit_expr_closure(&mut self, _: &'ast syn::ExprClosure) {}

        fn visit_expr_async(&mut self, _: &'ast syn::ExprAsync) {}

        fn visit_item(&mut self, _: &'ast syn::Item) {}
    }

    let mut breaks = Breaks {
        label: expr_loop.label.as_ref().map(|label| &label.name),
        depth: 0,
        found: false,
    };
    breaks.visit_block(&expr_loop.body);
    breaks.found
}

/// The group member called by `func`, if it is a bare single-segment path.
fn group_call<'a>(func: &Expr, names: &'a [Ident]) -> Option<&'a Ident> {
    let Expr::Path(path) = func else {
        return None;
    };
    if path.qself.is_some() || path.path.leading_colon.is_some() {
        return None;
    }
    let ident = path.path.get_ident()?;
    names.iter().find(|name| *name == ident)
}

/// Rewrites every `return` in a fn body. Closures and nested items return
/// from themselves and are left alone.
struct ReturnRewriter<'a> {
    next_enum: &'a Ident,
    names: &'a [Ident],
}

impl VisitMut for ReturnRewriter<'_> {
    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        if let Expr::Return(ret) = expr {
            let next_enum = self.next_enum;
            ret.expr = Some(Box::new(match ret.expr.take() {
                Some(mut value) => {
                    self.visit_expr_mut(&mut value);
                    rewrite_tail(*value, next_enum, self.names)
                }
                None => parse_quote!(#next_enum::__Done(())),
            }));
        } else {
            visit_mut::visit_expr_mut(self, expr);
        }
    }

    fn visit_expr_closure_mut(&mut self, _: &mut syn::ExprClosure) {}

    fn visit_expr_async_mut(&mut self, _: &mut syn::ExprAsync) {}

    fn visit_item_mut(&mut self, _: &mut syn::Item) {}
}
