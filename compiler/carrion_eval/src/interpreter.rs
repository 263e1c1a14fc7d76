//! The tree-walking interpreter.
//!
//! Statement evaluation threads a [`Flow`] value so `return`/`stop`/`skip`
//! unwind through blocks without abusing `Err`; runtime failures use
//! [`EvalError`] and are caught only by `attempt` blocks.

use crate::errors::undefined;
use crate::value::{ClassValue, FunctionValue, InstanceValue};
use crate::{builtins, Environment, EvalError, EvalResult, Value};
use carrion_ir::ast::*;
use rustc_hash::FxHashMap;

/// Guard against runaway recursion in ingested package code.
const MAX_CALL_DEPTH: u32 = 200;
/// Guard against non-terminating loops in ingested package code.
const MAX_LOOP_ITERATIONS: u64 = 1_000_000;

/// Evaluate a whole program in `env`. Returns the value of the last
/// expression statement, `None` otherwise.
pub fn eval_program(program: &Program, env: &mut Environment) -> EvalResult {
    let mut interp = Interp { env, depth: 0 };
    let mut last = Value::None;
    for stmt in &program.statements {
        match interp.eval_statement(stmt)? {
            Flow::Normal(value) => last = value,
            Flow::Return(value) => return Ok(value),
            Flow::Stop | Flow::Skip => break,
        }
    }
    Ok(last)
}

enum Flow {
    Normal(Value),
    Return(Value),
    Stop,
    Skip,
}

struct Interp<'e> {
    env: &'e mut Environment,
    depth: u32,
}

impl Interp<'_> {
    fn eval_statement(&mut self, stmt: &Statement) -> Result<Flow, EvalError> {
        match stmt {
            Statement::Expression(s) => Ok(Flow::Normal(self.eval_expression(&s.expression)?)),
            Statement::Assign(s) => {
                self.eval_assign(s)?;
                Ok(Flow::Normal(Value::None))
            }
            Statement::Return(s) => {
                let value = match &s.value {
                    Some(expr) => self.eval_expression(expr)?,
                    None => Value::None,
                };
                Ok(Flow::Return(value))
            }
            Statement::Function(f) => {
                self.env
                    .define(f.name.clone(), Value::Function(function_value(f)));
                Ok(Flow::Normal(Value::None))
            }
            Statement::Class(c) => {
                self.env.define(c.name.clone(), Value::Class(class_value(c)));
                Ok(Flow::Normal(Value::None))
            }
            Statement::If(s) => self.eval_if(s),
            Statement::For(s) => self.eval_for(s),
            Statement::While(s) => self.eval_while(s),
            Statement::Attempt(s) => self.eval_attempt(s),
            Statement::Autoclose(s) => {
                // Blocks do not scope in Carrion; the bound resource name
                // simply joins the surrounding scope.
                let resource = self.eval_expression(&s.resource)?;
                self.env.assign(&s.variable, resource);
                self.eval_block(&s.body)
            }
            Statement::Match(s) => self.eval_match(s),
            Statement::Main(s) => self.eval_block(&s.body),
            // Imports resolve through the package prober, not the
            // evaluator; `global` is meaningful only to the real runtime.
            Statement::Import(_) | Statement::Global(_) => Ok(Flow::Normal(Value::None)),
            Statement::Raise(s) => {
                let value = match &s.value {
                    Some(expr) => self.eval_expression(expr)?,
                    None => Value::Str("error".to_string()),
                };
                Err(EvalError::new(value.to_string()))
            }
            Statement::Check(s) => {
                let cond = self.eval_expression(&s.condition)?;
                if cond.is_truthy() {
                    Ok(Flow::Normal(Value::None))
                } else {
                    let msg = match &s.message {
                        Some(expr) => self.eval_expression(expr)?.to_string(),
                        None => "check failed".to_string(),
                    };
                    Err(EvalError::new(msg))
                }
            }
            Statement::Stop(_) => Ok(Flow::Stop),
            Statement::Skip(_) => Ok(Flow::Skip),
            Statement::Ignore(_) => Ok(Flow::Normal(Value::None)),
        }
    }

    fn eval_block(&mut self, block: &Block) -> Result<Flow, EvalError> {
        for stmt in &block.statements {
            match self.eval_statement(stmt)? {
                Flow::Normal(_) => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal(Value::None))
    }

    fn eval_assign(&mut self, assign: &AssignStatement) -> Result<(), EvalError> {
        let rhs = self.eval_expression(&assign.value)?;
        let value = if assign.operator == "=" {
            rhs
        } else {
            let op = &assign.operator[..1];
            let current = self.eval_expression(&assign.target)?;
            binary_op(op, &current, &rhs)?
        };

        match &assign.target {
            Expression::Identifier(id) => {
                self.env.assign(&id.name, value);
                Ok(())
            }
            Expression::Dot(dot) => {
                let Some(object_name) = dot.object.as_identifier().map(str::to_string) else {
                    return Err(EvalError::new("unsupported assignment target"));
                };
                let Some(Value::Instance(mut instance)) = self.env.get(&object_name).cloned()
                else {
                    return Err(EvalError::new(format!(
                        "cannot set field on non-instance {object_name}"
                    )));
                };
                instance.fields.insert(dot.property.clone(), value);
                self.env.assign(&object_name, Value::Instance(instance));
                Ok(())
            }
            Expression::Index(index) => {
                let Some(object_name) = index.object.as_identifier().map(str::to_string) else {
                    return Err(EvalError::new("unsupported assignment target"));
                };
                let key = self.eval_expression(&index.index)?;
                let Some(current) = self.env.get(&object_name).cloned() else {
                    return Err(undefined(&object_name));
                };
                let updated = match current {
                    Value::Array(mut items) => {
                        let Value::Int(i) = key else {
                            return Err(EvalError::new("array index must be an int"));
                        };
                        let idx = normalize_index(i, items.len())?;
                        items[idx] = value;
                        Value::Array(items)
                    }
                    Value::Hash(mut pairs) => {
                        match pairs.iter_mut().find(|(k, _)| *k == key) {
                            Some(pair) => pair.1 = value,
                            None => pairs.push((key, value)),
                        }
                        Value::Hash(pairs)
                    }
                    other => {
                        return Err(EvalError::new(format!(
                            "cannot index-assign into {}",
                            other.type_name()
                        )))
                    }
                };
                self.env.assign(&object_name, updated);
                Ok(())
            }
            Expression::TupleLit(targets) => {
                let values = match value {
                    Value::Tuple(v) | Value::Array(v) => v,
                    other => {
                        return Err(EvalError::new(format!(
                            "cannot unpack {} into a tuple",
                            other.type_name()
                        )))
                    }
                };
                if values.len() != targets.elements.len() {
                    return Err(EvalError::new("tuple unpack length mismatch"));
                }
                for (target, v) in targets.elements.iter().zip(values) {
                    let Some(name) = target.as_identifier() else {
                        return Err(EvalError::new("unsupported assignment target"));
                    };
                    self.env.assign(name, v);
                }
                Ok(())
            }
            _ => Err(EvalError::new("unsupported assignment target")),
        }
    }

    fn eval_if(&mut self, stmt: &IfStatement) -> Result<Flow, EvalError> {
        if self.eval_expression(&stmt.condition)?.is_truthy() {
            return self.eval_block(&stmt.consequence);
        }
        for branch in &stmt.otherwise_branches {
            if self.eval_expression(&branch.condition)?.is_truthy() {
                return self.eval_block(&branch.consequence);
            }
        }
        match &stmt.alternative {
            Some(block) => self.eval_block(block),
            None => Ok(Flow::Normal(Value::None)),
        }
    }

    fn eval_for(&mut self, stmt: &ForStatement) -> Result<Flow, EvalError> {
        let items = match self.eval_expression(&stmt.iterable)? {
            Value::Array(v) | Value::Tuple(v) => v,
            Value::Str(s) => s.chars().map(|c| Value::Str(c.to_string())).collect(),
            Value::Hash(pairs) => pairs.into_iter().map(|(k, _)| k).collect(),
            other => {
                return Err(EvalError::new(format!(
                    "cannot iterate over {}",
                    other.type_name()
                )))
            }
        };

        let mut stopped = false;
        for item in items {
            self.bind_loop_variable(&stmt.variable, item)?;
            match self.eval_block(&stmt.body)? {
                Flow::Normal(_) | Flow::Skip => {}
                Flow::Stop => {
                    stopped = true;
                    break;
                }
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }

        if !stopped {
            if let Some(alt) = &stmt.alternative {
                return self.eval_block(alt);
            }
        }
        Ok(Flow::Normal(Value::None))
    }

    fn bind_loop_variable(&mut self, variable: &Expression, item: Value) -> Result<(), EvalError> {
        match variable {
            Expression::Identifier(id) => {
                self.env.assign(&id.name, item);
                Ok(())
            }
            Expression::TupleLit(tuple) => {
                let values = match item {
                    Value::Tuple(v) | Value::Array(v) => v,
                    other => {
                        return Err(EvalError::new(format!(
                            "cannot unpack {} in for loop",
                            other.type_name()
                        )))
                    }
                };
                if values.len() != tuple.elements.len() {
                    return Err(EvalError::new("for loop unpack length mismatch"));
                }
                for (target, v) in tuple.elements.iter().zip(values) {
                    let Some(name) = target.as_identifier() else {
                        return Err(EvalError::new("unsupported loop variable"));
                    };
                    self.env.assign(name, v);
                }
                Ok(())
            }
            _ => Err(EvalError::new("unsupported loop variable")),
        }
    }

    fn eval_while(&mut self, stmt: &WhileStatement) -> Result<Flow, EvalError> {
        let mut iterations: u64 = 0;
        while self.eval_expression(&stmt.condition)?.is_truthy() {
            iterations += 1;
            if iterations > MAX_LOOP_ITERATIONS {
                return Err(EvalError::new("while loop exceeded iteration limit"));
            }
            match self.eval_block(&stmt.body)? {
                Flow::Normal(_) | Flow::Skip => {}
                Flow::Stop => break,
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }
        Ok(Flow::Normal(Value::None))
    }

    fn eval_attempt(&mut self, stmt: &AttemptStatement) -> Result<Flow, EvalError> {
        let result = self.eval_block(&stmt.try_block);
        let flow = match result {
            Ok(flow) => Ok(flow),
            Err(err) => match stmt.ensnare_clauses.first() {
                Some(clause) => {
                    if let Some(alias) = &clause.alias {
                        self.env
                            .assign(alias, Value::Str(err.message().to_string()));
                    }
                    self.eval_block(&clause.body)
                }
                None => Err(err),
            },
        };

        if let Some(resolve) = &stmt.resolve_block {
            match self.eval_block(resolve)? {
                Flow::Normal(_) => {}
                other => return Ok(other),
            }
        }
        flow
    }

    fn eval_match(&mut self, stmt: &MatchStatement) -> Result<Flow, EvalError> {
        let value = self.eval_expression(&stmt.value)?;
        for case in &stmt.cases {
            let cond = self.eval_expression(&case.condition)?;
            if cond == value {
                return self.eval_block(&case.body);
            }
        }
        match &stmt.default {
            Some(block) => self.eval_block(block),
            None => Ok(Flow::Normal(Value::None)),
        }
    }

    // === Expressions ===

    fn eval_expression(&mut self, expr: &Expression) -> EvalResult {
        match expr {
            Expression::Identifier(id) => self.lookup(&id.name),
            Expression::IntegerLit(lit) => Ok(Value::Int(lit.value)),
            Expression::FloatLit(lit) => Ok(Value::Float(lit.value)),
            Expression::StringLit(lit) => Ok(Value::Str(lit.value.clone())),
            Expression::BoolLit(lit) => Ok(Value::Bool(lit.value)),
            Expression::NoneLit(_) => Ok(Value::None),
            Expression::ArrayLit(lit) => {
                let mut items = Vec::with_capacity(lit.elements.len());
                for element in &lit.elements {
                    items.push(self.eval_expression(element)?);
                }
                Ok(Value::Array(items))
            }
            Expression::HashLit(lit) => {
                let mut pairs = Vec::with_capacity(lit.pairs.len());
                for (key, value) in &lit.pairs {
                    pairs.push((self.eval_expression(key)?, self.eval_expression(value)?));
                }
                Ok(Value::Hash(pairs))
            }
            Expression::TupleLit(lit) => {
                let mut items = Vec::with_capacity(lit.elements.len());
                for element in &lit.elements {
                    items.push(self.eval_expression(element)?);
                }
                Ok(Value::Tuple(items))
            }
            Expression::Infix(infix) => self.eval_infix(infix),
            Expression::Prefix(prefix) => {
                let operand = self.eval_expression(&prefix.operand)?;
                match prefix.operator.as_str() {
                    "-" => match operand {
                        Value::Int(n) => Ok(Value::Int(-n)),
                        Value::Float(f) => Ok(Value::Float(-f)),
                        other => Err(EvalError::new(format!(
                            "cannot negate {}",
                            other.type_name()
                        ))),
                    },
                    "not" => Ok(Value::Bool(!operand.is_truthy())),
                    op => Err(EvalError::new(format!("unknown prefix operator {op}"))),
                }
            }
            Expression::Call(call) => self.eval_call(call),
            Expression::Dot(dot) => self.eval_dot(dot),
            Expression::Index(index) => self.eval_index(index),
            Expression::Slice(slice) => self.eval_slice(slice),
        }
    }

    fn lookup(&mut self, name: &str) -> EvalResult {
        if let Some(value) = self.env.get(name) {
            return Ok(value.clone());
        }
        if let Some(&(name, func)) = builtins::builtins().iter().find(|(n, _)| *n == name) {
            return Ok(Value::Builtin(crate::value::BuiltinValue { name, func }));
        }
        Err(undefined(name))
    }

    fn eval_infix(&mut self, infix: &InfixExpression) -> EvalResult {
        match infix.operator.as_str() {
            "and" => {
                let left = self.eval_expression(&infix.left)?;
                if !left.is_truthy() {
                    return Ok(left);
                }
                self.eval_expression(&infix.right)
            }
            "or" => {
                let left = self.eval_expression(&infix.left)?;
                if left.is_truthy() {
                    return Ok(left);
                }
                self.eval_expression(&infix.right)
            }
            op => {
                let left = self.eval_expression(&infix.left)?;
                let right = self.eval_expression(&infix.right)?;
                binary_op(op, &left, &right)
            }
        }
    }

    fn eval_call(&mut self, call: &CallExpression) -> EvalResult {
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.eval_expression(arg)?);
        }

        // Method calls need the receiver threaded through, so `a.b(...)`
        // is dispatched here rather than by evaluating the dot first.
        if let Expression::Dot(dot) = call.callee.as_ref() {
            return self.eval_method_call(dot, args);
        }

        let callee = self.eval_expression(&call.callee)?;
        self.apply(callee, args)
    }

    fn apply(&mut self, callee: Value, args: Vec<Value>) -> EvalResult {
        match callee {
            Value::Builtin(b) => (b.func)(&args),
            Value::Function(f) => self.call_function(&f, args, None).map(|(v, _)| v),
            Value::Class(c) => self.instantiate(&c, args),
            other => Err(EvalError::new(format!(
                "{} is not callable",
                other.type_name()
            ))),
        }
    }

    fn instantiate(&mut self, class: &ClassValue, args: Vec<Value>) -> EvalResult {
        if class.is_arcane {
            return Err(EvalError::new(format!(
                "arcane grimoire {} cannot be instantiated",
                class.name
            )));
        }
        let instance = Value::Instance(InstanceValue {
            class: class.name.clone(),
            fields: FxHashMap::default(),
        });
        let Some(init) = self.find_method(class, "init") else {
            return Ok(instance);
        };
        let (_, self_after) = self.call_function(&init, args, Some(instance.clone()))?;
        Ok(self_after.unwrap_or(instance))
    }

    /// Call a user function. Returns the result and, when a receiver was
    /// bound, the (possibly field-mutated) receiver.
    fn call_function(
        &mut self,
        func: &FunctionValue,
        args: Vec<Value>,
        receiver: Option<Value>,
    ) -> Result<(Value, Option<Value>), EvalError> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(EvalError::new("call depth limit exceeded"));
        }

        self.env.push_scope();
        let had_receiver = receiver.is_some();
        if let Some(receiver) = receiver {
            self.env.define("self", receiver);
        }

        let result = self.bind_params(func, args).and_then(|()| {
            self.depth += 1;
            let flow = self.eval_block(&func.body);
            self.depth -= 1;
            flow
        });

        let self_after = had_receiver.then(|| self.env.get("self").cloned()).flatten();
        self.env.pop_scope();

        let value = match result? {
            Flow::Return(value) => value,
            _ => Value::None,
        };
        Ok((value, self_after))
    }

    fn bind_params(&mut self, func: &FunctionValue, args: Vec<Value>) -> Result<(), EvalError> {
        let mut args = args.into_iter();
        for param in &func.params {
            let value = match args.next() {
                Some(value) => value,
                None => match &param.default {
                    Some(default) => self.eval_expression(default)?,
                    None => {
                        return Err(EvalError::new(format!(
                            "{} missing argument {}",
                            func.name, param.name
                        )))
                    }
                },
            };
            self.env.define(param.name.clone(), value);
        }
        Ok(())
    }

    fn eval_method_call(&mut self, dot: &DotExpression, args: Vec<Value>) -> EvalResult {
        let object = self.eval_expression(&dot.object)?;
        match object {
            Value::Instance(instance) => {
                let class = self.class_of(&instance.class)?;
                let Some(method) = self.find_method(&class, &dot.property) else {
                    return Err(EvalError::new(format!(
                        "{} has no spell {}",
                        instance.class, dot.property
                    )));
                };
                let receiver = Value::Instance(instance);
                let (value, self_after) = self.call_function(&method, args, Some(receiver))?;
                // Write mutated fields back when the receiver is a simple
                // variable.
                if let (Some(updated), Some(name)) = (self_after, dot.object.as_identifier()) {
                    self.env.assign(name, updated);
                }
                Ok(value)
            }
            Value::Class(class) => {
                let Some(method) = self.find_method(&class, &dot.property) else {
                    return Err(EvalError::new(format!(
                        "{} has no spell {}",
                        class.name, dot.property
                    )));
                };
                self.call_function(&method, args, None).map(|(v, _)| v)
            }
            other => Err(EvalError::new(format!(
                "{} has no spell {}",
                other.type_name(),
                dot.property
            ))),
        }
    }

    fn eval_dot(&mut self, dot: &DotExpression) -> EvalResult {
        let object = self.eval_expression(&dot.object)?;
        match object {
            Value::Instance(instance) => {
                if let Some(value) = instance.fields.get(&dot.property) {
                    return Ok(value.clone());
                }
                let class = self.class_of(&instance.class)?;
                match self.find_method(&class, &dot.property) {
                    Some(method) => Ok(Value::Function(method)),
                    None => Err(EvalError::new(format!(
                        "{} has no member {}",
                        instance.class, dot.property
                    ))),
                }
            }
            Value::Class(class) => match self.find_method(&class, &dot.property) {
                Some(method) => Ok(Value::Function(method)),
                None => Err(EvalError::new(format!(
                    "{} has no spell {}",
                    class.name, dot.property
                ))),
            },
            other => Err(EvalError::new(format!(
                "{} has no member {}",
                other.type_name(),
                dot.property
            ))),
        }
    }

    fn class_of(&self, name: &str) -> Result<ClassValue, EvalError> {
        match self.env.get(name) {
            Some(Value::Class(class)) => Ok(class.clone()),
            _ => Err(EvalError::new(format!("unknown grimoire {name}"))),
        }
    }

    /// Find a method by walking the inheritance chain.
    fn find_method(&self, class: &ClassValue, name: &str) -> Option<FunctionValue> {
        if name == "init" {
            if let Some(init) = &class.init {
                return Some(init.clone());
            }
        }
        if let Some(method) = class.methods.get(name) {
            return Some(method.clone());
        }
        let parent = class.inherits.as_ref()?;
        let parent_class = match self.env.get(parent) {
            Some(Value::Class(c)) => c.clone(),
            _ => return None,
        };
        self.find_method(&parent_class, name)
    }

    fn eval_index(&mut self, index: &IndexExpression) -> EvalResult {
        let object = self.eval_expression(&index.object)?;
        let key = self.eval_expression(&index.index)?;
        match (object, key) {
            (Value::Array(items), Value::Int(i)) => {
                let idx = normalize_index(i, items.len())?;
                Ok(items[idx].clone())
            }
            (Value::Tuple(items), Value::Int(i)) => {
                let idx = normalize_index(i, items.len())?;
                Ok(items[idx].clone())
            }
            (Value::Str(s), Value::Int(i)) => {
                let chars: Vec<char> = s.chars().collect();
                let idx = normalize_index(i, chars.len())?;
                Ok(Value::Str(chars[idx].to_string()))
            }
            (Value::Hash(pairs), key) => pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| EvalError::new(format!("key not found: {key}"))),
            (other, _) => Err(EvalError::new(format!(
                "cannot index {}",
                other.type_name()
            ))),
        }
    }

    fn eval_slice(&mut self, slice: &SliceExpression) -> EvalResult {
        let object = self.eval_expression(&slice.object)?;
        let start = match &slice.start {
            Some(expr) => match self.eval_expression(expr)? {
                Value::Int(n) => Some(n),
                _ => return Err(EvalError::new("slice bounds must be ints")),
            },
            None => None,
        };
        let end = match &slice.end {
            Some(expr) => match self.eval_expression(expr)? {
                Value::Int(n) => Some(n),
                _ => return Err(EvalError::new("slice bounds must be ints")),
            },
            None => None,
        };

        match object {
            Value::Array(items) => {
                let (lo, hi) = slice_bounds(start, end, items.len());
                Ok(Value::Array(items[lo..hi].to_vec()))
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let (lo, hi) = slice_bounds(start, end, chars.len());
                Ok(Value::Str(chars[lo..hi].iter().collect()))
            }
            other => Err(EvalError::new(format!(
                "cannot slice {}",
                other.type_name()
            ))),
        }
    }
}

/// Convert a function definition into its runtime value.
pub(crate) fn function_value(def: &FunctionDef) -> FunctionValue {
    FunctionValue {
        name: def.name.clone(),
        params: def.params.clone(),
        body: def.body.clone(),
        doc: def.doc_string.clone(),
        is_arcane: def.is_arcane,
    }
}

/// Convert a class definition into its runtime value.
pub(crate) fn class_value(def: &ClassDef) -> ClassValue {
    let mut methods = FxHashMap::default();
    for method in &def.methods {
        methods.insert(method.name.clone(), function_value(method));
    }
    ClassValue {
        name: def.name.clone(),
        is_arcane: def.is_arcane,
        inherits: def.inherits.clone(),
        doc: def.doc_string.clone(),
        init: def.init.as_ref().map(function_value),
        methods,
    }
}

fn normalize_index(i: i64, len: usize) -> Result<usize, EvalError> {
    let idx = if i < 0 { i + len as i64 } else { i };
    if idx < 0 || idx as usize >= len {
        return Err(EvalError::new(format!("index {i} out of range")));
    }
    Ok(idx as usize)
}

fn slice_bounds(start: Option<i64>, end: Option<i64>, len: usize) -> (usize, usize) {
    let clamp = |n: i64| -> usize {
        let n = if n < 0 { n + len as i64 } else { n };
        n.clamp(0, len as i64) as usize
    };
    let lo = start.map(clamp).unwrap_or(0);
    let hi = end.map(clamp).unwrap_or(len);
    (lo, hi.max(lo))
}

fn binary_op(op: &str, left: &Value, right: &Value) -> EvalResult {
    use Value::*;
    match op {
        "+" => match (left, right) {
            (Int(a), Int(b)) => a
                .checked_add(*b)
                .map(Int)
                .ok_or_else(|| EvalError::new("integer overflow")),
            (Float(a), Float(b)) => Ok(Float(a + b)),
            (Int(a), Float(b)) => Ok(Float(*a as f64 + b)),
            (Float(a), Int(b)) => Ok(Float(a + *b as f64)),
            (Str(a), Str(b)) => Ok(Str(format!("{a}{b}"))),
            (Array(a), Array(b)) => {
                let mut out = a.clone();
                out.extend(b.iter().cloned());
                Ok(Array(out))
            }
            _ => Err(type_mismatch(op, left, right)),
        },
        "-" => match (left, right) {
            (Int(a), Int(b)) => a
                .checked_sub(*b)
                .map(Int)
                .ok_or_else(|| EvalError::new("integer overflow")),
            (Float(a), Float(b)) => Ok(Float(a - b)),
            (Int(a), Float(b)) => Ok(Float(*a as f64 - b)),
            (Float(a), Int(b)) => Ok(Float(a - *b as f64)),
            _ => Err(type_mismatch(op, left, right)),
        },
        "*" => match (left, right) {
            (Int(a), Int(b)) => a
                .checked_mul(*b)
                .map(Int)
                .ok_or_else(|| EvalError::new("integer overflow")),
            (Float(a), Float(b)) => Ok(Float(a * b)),
            (Int(a), Float(b)) => Ok(Float(*a as f64 * b)),
            (Float(a), Int(b)) => Ok(Float(a * *b as f64)),
            (Str(s), Int(n)) if *n >= 0 => Ok(Str(s.repeat(*n as usize))),
            _ => Err(type_mismatch(op, left, right)),
        },
        "/" => match (left, right) {
            (_, Int(0)) => Err(EvalError::new("division by zero")),
            (Int(a), Int(b)) => Ok(Int(a / b)),
            (Float(a), Float(b)) => Ok(Float(a / b)),
            (Int(a), Float(b)) => Ok(Float(*a as f64 / b)),
            (Float(a), Int(b)) => Ok(Float(a / *b as f64)),
            _ => Err(type_mismatch(op, left, right)),
        },
        "%" => match (left, right) {
            (_, Int(0)) => Err(EvalError::new("modulo by zero")),
            (Int(a), Int(b)) => Ok(Int(a % b)),
            _ => Err(type_mismatch(op, left, right)),
        },
        "==" => Ok(Bool(values_equal(left, right))),
        "!=" => Ok(Bool(!values_equal(left, right))),
        "<" | ">" | "<=" | ">=" => compare(op, left, right),
        _ => Err(EvalError::new(format!("unknown operator {op}"))),
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
        _ => left == right,
    }
}

fn compare(op: &str, left: &Value, right: &Value) -> EvalResult {
    let ord = match (left, right) {
        (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
        _ => return Err(type_mismatch(op, left, right)),
    };
    let Some(ord) = ord else {
        return Ok(Value::Bool(false));
    };
    Ok(Value::Bool(match op {
        "<" => ord.is_lt(),
        ">" => ord.is_gt(),
        "<=" => ord.is_le(),
        ">=" => ord.is_ge(),
        _ => unreachable!(),
    }))
}

fn type_mismatch(op: &str, left: &Value, right: &Value) -> EvalError {
    EvalError::new(format!(
        "unsupported operands for {op}: {} and {}",
        left.type_name(),
        right.type_name()
    ))
}

