//! 三维 16 位整数表，用于地图和数据库数据

/// 三维 i16 表
///
/// 数据按 x 最快、z 最慢的顺序存储。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    xsize: usize,
    ysize: usize,
    zsize: usize,
    data: Vec<i16>,
}

impl Table {
    /// 创建表，负数尺寸按 0 处理
    pub fn new(xsize: i32, ysize: i32, zsize: i32) -> Self {
        let (xsize, ysize, zsize) = (size(xsize), size(ysize), size(zsize));
        Self {
            xsize,
            ysize,
            zsize,
            data: vec![0; xsize * ysize * zsize],
        }
    }

    pub fn xsize(&self) -> usize {
        self.xsize
    }

    pub fn ysize(&self) -> usize {
        self.ysize
    }

    pub fn zsize(&self) -> usize {
        self.zsize
    }

    fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        let (x, y, z) = (
            usize::try_from(x).ok()?,
            usize::try_from(y).ok()?,
            usize::try_from(z).ok()?,
        );
        if x >= self.xsize || y >= self.ysize || z >= self.zsize {
            return None;
        }
        Some(x + self.xsize * (y + self.ysize * z))
    }

    /// 越界返回 `None`
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<i16> {
        self.index(x, y, z).map(|i| self.data[i])
    }

    /// 越界写入被忽略
    pub fn set(&mut self, x: i32, y: i32, z: i32, value: i16) {
        if let Some(i) = self.index(x, y, z) {
            self.data[i] = value;
        }
    }

    /// 调整尺寸，保留重叠区域的数据
    pub fn resize(&mut self, xsize: i32, ysize: i32, zsize: i32) {
        let mut resized = Table::new(xsize, ysize, zsize);
        for z in 0..self.zsize.min(resized.zsize) {
            for y in 0..self.ysize.min(resized.ysize) {
                for x in 0..self.xsize.min(resized.xsize) {
                    let from = x + self.xsize * (y + self.ysize * z);
                    let to = x + resized.xsize * (y + resized.ysize * z);
                    resized.data[to] = self.data[from];
                }
            }
        }
        *self = resized;
    }

    pub fn data(&self) -> &[i16] {
        &self.data
    }
}

fn size(value: i32) -> usize {
    usize::try_from(value).unwrap_or(0)
}

/// 把脚本整数截断为表元素
pub fn to_element(value: i64) -> i16 {
    value as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut table = Table::new(3, 2, 1);
        table.set(2, 1, 0, 42);
        assert_eq!(table.get(2, 1, 0), Some(42));
        assert_eq!(table.get(3, 0, 0), None);
        assert_eq!(table.get(-1, 0, 0), None);
    }

    #[test]
    fn test_negative_sizes_are_zero() {
        let table = Table::new(-4, 1, 1);
        assert_eq!(table.xsize(), 0);
        assert!(table.data().is_empty());
        assert_eq!(table.get(0, 0, 0), None);
    }

    #[test]
    fn test_resize_keeps_overlap() {
        let mut table = Table::new(2, 2, 1);
        table.set(0, 0, 0, 1);
        table.set(1, 1, 0, 4);
        table.resize(3, 1, 2);
        assert_eq!(table.get(0, 0, 0), Some(1));
        assert_eq!(table.get(1, 1, 0), None);
        assert_eq!(table.get(2, 0, 1), Some(0));
    }

    #[test]
    fn test_element_wraps() {
        assert_eq!(to_element(70000), 4464);
        assert_eq!(to_element(-1), -1);
    }
}
