//! 依赖字典
//!
//! 外部协作方：提供已分析源码之外的类型、数据库表/视图、类、接口和函数
//! 模块。多个文件的解析会并发查询，实现必须 `Send + Sync`；核心从不修改它。

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::definitions::{ClassDefinition, InterfaceDefinition, MethodParameter};
use crate::frontend::core::type_system::{AbapType, Component};

/// 数据库表或视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    /// 行结构类型（带限定名）
    pub ty: AbapType,
    pub components: Vec<Component>,
}

impl TableDefinition {
    pub fn new(
        name: &str,
        components: Vec<Component>,
    ) -> Self {
        Self {
            ty: AbapType::structure(components.clone()).with_name(name.to_ascii_uppercase()),
            components,
        }
    }
}

/// 函数模块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionModule {
    pub name: String,
    pub parameters: Vec<MethodParameter>,
}

/// 依赖查询接口
pub trait Dictionary: Send + Sync {
    /// 按限定名查找数据类型（数据元素、表类型、`zcl_foo=>ty` 等）
    fn lookup_type(
        &self,
        qualified_name: &str,
    ) -> Option<AbapType>;

    /// 查找数据库表或视图
    fn lookup_table_or_view(
        &self,
        name: &str,
    ) -> Option<TableDefinition>;

    fn lookup_class(
        &self,
        _name: &str,
    ) -> Option<Arc<ClassDefinition>> {
        None
    }

    fn lookup_interface(
        &self,
        _name: &str,
    ) -> Option<Arc<InterfaceDefinition>> {
        None
    }

    fn lookup_function_module(
        &self,
        _name: &str,
    ) -> Option<FunctionModule> {
        None
    }
}

/// 空字典：所有外部名称都视为缺失
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDictionary;

impl Dictionary for EmptyDictionary {
    fn lookup_type(
        &self,
        _qualified_name: &str,
    ) -> Option<AbapType> {
        None
    }

    fn lookup_table_or_view(
        &self,
        _name: &str,
    ) -> Option<TableDefinition> {
        None
    }
}

/// 内存字典，在分析前填充
#[derive(Debug, Default)]
pub struct MemoryDictionary {
    types: RwLock<HashMap<String, AbapType>>,
    tables: RwLock<HashMap<String, TableDefinition>>,
    classes: RwLock<HashMap<String, Arc<ClassDefinition>>>,
    interfaces: RwLock<HashMap<String, Arc<InterfaceDefinition>>>,
    functions: RwLock<HashMap<String, FunctionModule>>,
}

impl MemoryDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type(
        &self,
        name: &str,
        ty: AbapType,
    ) {
        let key = name.to_ascii_uppercase();
        let ty = ty.with_name(key.clone());
        self.types.write().insert(key, ty);
    }

    pub fn add_table(
        &self,
        name: &str,
        components: Vec<Component>,
    ) {
        self.tables.write().insert(
            name.to_ascii_uppercase(),
            TableDefinition::new(name, components),
        );
    }

    pub fn add_class(
        &self,
        class: ClassDefinition,
    ) {
        self.classes
            .write()
            .insert(class.name.clone(), Arc::new(class));
    }

    pub fn add_interface(
        &self,
        interface: InterfaceDefinition,
    ) {
        self.interfaces
            .write()
            .insert(interface.name.clone(), Arc::new(interface));
    }

    pub fn add_function_module(
        &self,
        function: FunctionModule,
    ) {
        self.functions
            .write()
            .insert(function.name.to_ascii_uppercase(), function);
    }
}

impl Dictionary for MemoryDictionary {
    fn lookup_type(
        &self,
        qualified_name: &str,
    ) -> Option<AbapType> {
        self.types
            .read()
            .get(&qualified_name.to_ascii_uppercase())
            .cloned()
    }

    fn lookup_table_or_view(
        &self,
        name: &str,
    ) -> Option<TableDefinition> {
        self.tables.read().get(&name.to_ascii_uppercase()).cloned()
    }

    fn lookup_class(
        &self,
        name: &str,
    ) -> Option<Arc<ClassDefinition>> {
        self.classes.read().get(&name.to_ascii_uppercase()).cloned()
    }

    fn lookup_interface(
        &self,
        name: &str,
    ) -> Option<Arc<InterfaceDefinition>> {
        self.interfaces
            .read()
            .get(&name.to_ascii_uppercase())
            .cloned()
    }

    fn lookup_function_module(
        &self,
        name: &str,
    ) -> Option<FunctionModule> {
        self.functions
            .read()
            .get(&name.to_ascii_uppercase())
            .cloned()
    }
}
